//! Block schemas and the socket type system
//!
//! A schema describes one block kind: its lines of slots, the value type it
//! produces when used as an expression, and the value type it consumes when
//! used as a statement target. Sockets carry an I/O kind that decides which
//! candidate schemas may be plugged into them.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};

/// Value kinds flowing between blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ValueType {
    /// Text value
    Text,
    /// Numeric value
    Num,
    /// Boolean value
    Bool,
    /// Not usable in this role
    #[default]
    None,
}

impl ValueType {
    /// Catalogue spelling of the value type
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Text => "TEXT",
            ValueType::Num => "NUM",
            ValueType::Bool => "BOOL",
            ValueType::None => "NONE",
        }
    }

    /// Parse a value type name, case-insensitively. Unknown names map to `None`.
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "TEXT" => ValueType::Text,
            "NUM" => ValueType::Num,
            "BOOL" => ValueType::Bool,
            _ => ValueType::None,
        }
    }
}

impl From<String> for ValueType {
    fn from(name: String) -> Self {
        ValueType::parse(&name)
    }
}

impl From<ValueType> for String {
    fn from(value: ValueType) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// I/O kind of a code socket
///
/// `*In` sockets take an expression (or a typed literal). `*Out` sockets hand
/// this block's value to a statement, so the compatibility check looks at the
/// candidate's consumed type instead of its produced type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IoKind {
    NumIn,
    NumOut,
    TextIn,
    TextOut,
    BoolIn,
    BoolOut,
    #[default]
    None,
}

impl IoKind {
    /// Catalogue spelling of the I/O kind
    pub fn as_str(&self) -> &'static str {
        match self {
            IoKind::NumIn => "NUM_IN",
            IoKind::NumOut => "NUM_OUT",
            IoKind::TextIn => "TEXT_IN",
            IoKind::TextOut => "TEXT_OUT",
            IoKind::BoolIn => "BOOL_IN",
            IoKind::BoolOut => "BOOL_OUT",
            IoKind::None => "NONE",
        }
    }

    /// Parse an I/O kind name, case-insensitively. Unknown names map to `None`.
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "NUM_IN" => IoKind::NumIn,
            "NUM_OUT" => IoKind::NumOut,
            "TEXT_IN" => IoKind::TextIn,
            "TEXT_OUT" => IoKind::TextOut,
            "BOOL_IN" => IoKind::BoolIn,
            "BOOL_OUT" => IoKind::BoolOut,
            _ => IoKind::None,
        }
    }

    /// Literal type a socket of this kind accepts when no child is plugged in
    pub fn accepted_type(&self) -> ValueType {
        match self {
            IoKind::NumIn => ValueType::Num,
            IoKind::TextIn => ValueType::Text,
            IoKind::BoolIn => ValueType::Bool,
            _ => ValueType::None,
        }
    }

    pub fn is_input(&self) -> bool {
        matches!(self, IoKind::NumIn | IoKind::TextIn | IoKind::BoolIn)
    }

    pub fn is_output(&self) -> bool {
        matches!(self, IoKind::NumOut | IoKind::TextOut | IoKind::BoolOut)
    }

    /// Whether a block of schema `candidate` may be plugged into a socket of this kind
    ///
    /// Text inputs stringify numbers and booleans, so they accept all three
    /// produced types. Outputs invert the check: the candidate is a statement
    /// consuming this socket's value.
    pub fn accepts(&self, candidate: &BlockSchema) -> bool {
        let produced = candidate.produced_type();
        let consumed = candidate.consumed_type();
        match self {
            IoKind::BoolIn => produced == ValueType::Bool,
            IoKind::NumIn => produced == ValueType::Num,
            IoKind::TextIn => matches!(
                produced,
                ValueType::Text | ValueType::Num | ValueType::Bool
            ),
            IoKind::BoolOut => matches!(consumed, ValueType::Bool | ValueType::Text),
            IoKind::NumOut => matches!(consumed, ValueType::Num | ValueType::Text),
            IoKind::TextOut => consumed == ValueType::Text,
            IoKind::None => true,
        }
    }
}

impl From<String> for IoKind {
    fn from(name: String) -> Self {
        IoKind::parse(&name)
    }
}

impl From<IoKind> for String {
    fn from(kind: IoKind) -> Self {
        kind.as_str().to_string()
    }
}

impl std::fmt::Display for IoKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One position within a slot line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSlot", into = "RawSlot")]
pub enum Slot {
    /// Fixed label
    Text(String),
    /// Socket holding a literal or a child block
    Code(IoKind),
}

impl Slot {
    pub fn is_code(&self) -> bool {
        matches!(self, Slot::Code(_))
    }

    /// Literal type accepted by this slot (`None` for labels and output sockets)
    pub fn accepted_type(&self) -> ValueType {
        match self {
            Slot::Text(_) => ValueType::None,
            Slot::Code(kind) => kind.accepted_type(),
        }
    }

    /// Whether a block of schema `candidate` may be plugged into this slot.
    /// Labels never hold children.
    pub fn accepts(&self, candidate: &BlockSchema) -> bool {
        match self {
            Slot::Text(_) => false,
            Slot::Code(kind) => kind.accepts(candidate),
        }
    }
}

/// Catalogue shape of a slot: `{"type": "text"|"code", "value": ...}`
#[derive(Serialize, Deserialize)]
struct RawSlot {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    value: String,
}

impl TryFrom<RawSlot> for Slot {
    type Error = String;

    fn try_from(raw: RawSlot) -> Result<Self, Self::Error> {
        if raw.kind.eq_ignore_ascii_case("text") {
            Ok(Slot::Text(raw.value))
        } else if raw.kind.eq_ignore_ascii_case("code") {
            Ok(Slot::Code(IoKind::parse(&raw.value)))
        } else {
            Err(format!("Invalid slot type '{}'", raw.kind))
        }
    }
}

impl From<Slot> for RawSlot {
    fn from(slot: Slot) -> Self {
        match slot {
            Slot::Text(value) => RawSlot {
                kind: "text".to_string(),
                value,
            },
            Slot::Code(kind) => RawSlot {
                kind: "code".to_string(),
                value: kind.as_str().to_string(),
            },
        }
    }
}

/// A schema line: slots laid out left to right. An empty line holds a nested
/// statement sequence instead.
pub type Line = Vec<Slot>;

/// Immutable definition of one block kind
///
/// Shared between all block nodes of that kind through `Arc`. The deprecation
/// flag is the only mutable state and is global to the schema.
#[derive(Debug, Serialize, Deserialize)]
pub struct BlockSchema {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    category: usize,
    #[serde(rename = "returns", default)]
    produced_type: ValueType,
    #[serde(rename = "takes", default)]
    consumed_type: ValueType,
    lines: Vec<Line>,
    #[serde(rename = "isDeprecated", default)]
    deprecated: AtomicBool,
}

impl BlockSchema {
    /// Create a schema. The display name defaults to the id.
    pub fn new(
        id: impl Into<String>,
        produced_type: ValueType,
        consumed_type: ValueType,
        lines: Vec<Line>,
    ) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            category: 0,
            produced_type,
            consumed_type,
            lines,
            deprecated: AtomicBool::new(false),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_category(mut self, category: usize) -> Self {
        self.category = category;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name, falling back to the id
    pub fn name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }

    pub fn category(&self) -> usize {
        self.category
    }

    pub fn produced_type(&self) -> ValueType {
        self.produced_type
    }

    pub fn consumed_type(&self) -> ValueType {
        self.consumed_type
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn columns_in_line(&self, line: usize) -> usize {
        self.lines.get(line).map_or(0, |l| l.len())
    }

    pub fn is_sequence_line(&self, line: usize) -> bool {
        self.lines.get(line).is_some_and(|l| l.is_empty())
    }

    /// Whether the last line is a sequence line (which adds a closing line)
    pub fn ends_with_sequence(&self) -> bool {
        self.lines.last().is_some_and(|l| l.is_empty())
    }

    pub fn slot(&self, line: usize, column: usize) -> Option<&Slot> {
        self.lines.get(line).and_then(|l| l.get(column))
    }

    /// Whether `candidate` may be plugged into the slot at `(line, column)`
    pub fn accepts_at(&self, line: usize, column: usize, candidate: &BlockSchema) -> bool {
        self.slot(line, column)
            .is_some_and(|slot| slot.accepts(candidate))
    }

    /// Literal type accepted by the slot at `(line, column)`
    pub fn accepted_type_at(&self, line: usize, column: usize) -> ValueType {
        self.slot(line, column)
            .map_or(ValueType::None, Slot::accepted_type)
    }

    pub fn sequence_line_count(&self) -> usize {
        self.lines.iter().filter(|l| l.is_empty()).count()
    }

    /// Number of code sockets across all slot lines (the length of `params`)
    pub fn code_slot_count(&self) -> usize {
        self.lines.iter().flatten().filter(|s| s.is_code()).count()
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecated.load(Ordering::Relaxed)
    }

    pub(crate) fn set_deprecated(&self, deprecated: bool) {
        self.deprecated.store(deprecated, Ordering::Relaxed);
    }

    /// Check the structural invariants of the schema
    pub fn validate(&self) -> Result<(), String> {
        if self.id.is_empty() {
            return Err("Schema id cannot be empty".into());
        }
        if self.lines.is_empty() {
            return Err(format!("Schema '{}' must declare at least one line", self.id));
        }
        Ok(())
    }
}
