//! JSON (de)serialization of block trees
//!
//! A node is an object with a required `id`, an optional flat `params` array
//! holding one entry per code socket in line-major, column-minor order (a
//! nested node object, a literal string, or `""`), and an optional `blocks`
//! array holding one array of node objects per sequence line. Keys are
//! omitted when the schema declares no sockets or no sequence lines.
//!
//! Deserialization is strict: entry counts must match the schema exactly and
//! any error aborts the whole subtree, so no partially built node escapes.

use serde::ser::{Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::node::{BlockNode, LineContent, SlotContent};
use super::sequence::BlockSequence;
use super::{Container, TreeError};
use crate::core::registry::SchemaRegistry;
use crate::core::schema::ValueType;
use crate::core::ContainerId;
use crate::layout::LayoutMetrics;

/// Deepest block nesting a tree may reach, counting the root as level 0
///
/// Loading rejects deeper input and [`BlockNode::insert_at`] never nests a
/// drop below this level. Each level costs at most three JSON levels, so a
/// tree within the limit always stays under the 128-level recursion limit of
/// `serde_json` and any serialized program parses back from its string form.
pub const MAX_NESTING_DEPTH: usize = 40;

impl BlockNode {
    /// Serialize the subtree rooted at this node
    pub fn to_json(&self) -> Value {
        let mut params = Vec::new();
        let mut blocks = Vec::new();

        for (line, content) in self.lines.iter().enumerate() {
            match content {
                LineContent::Sequence(seq) => blocks.push(seq.to_json()),
                LineContent::Slots(slots) => {
                    for (column, slot) in slots.iter().enumerate() {
                        let Some(kind) = self.schema.slot(line, column) else {
                            continue;
                        };
                        if !kind.is_code() {
                            continue;
                        }
                        params.push(match slot {
                            SlotContent::Child(child) => child.to_json(),
                            SlotContent::Literal(value) if kind.accepted_type() != ValueType::None => {
                                Value::String(value.clone())
                            }
                            _ => Value::String(String::new()),
                        });
                    }
                }
            }
        }

        let mut object = Map::new();
        object.insert("id".into(), Value::String(self.schema.id().to_string()));
        if !params.is_empty() {
            object.insert("params".into(), Value::Array(params));
        }
        if !blocks.is_empty() {
            object.insert("blocks".into(), Value::Array(blocks));
        }
        Value::Object(object)
    }

    pub fn to_json_string(&self) -> String {
        self.to_json().to_string()
    }

    /// Rebuild a detached node from its serialized form
    ///
    /// # Arguments
    /// * `value` - A node object as produced by [`BlockNode::to_json`]
    /// * `registry` - Schema lookup for every `id` in the subtree
    /// * `metrics` - Layout metrics used to compute the geometry cache
    ///
    /// # Returns
    /// * `Ok(BlockNode)` with every descendant attached and sized
    /// * `Err(TreeError::UnknownSchema)` if an `id` is not registered
    /// * `Err(TreeError::MalformedInput)` if the shape does not match the schema
    pub fn from_json(
        value: &Value,
        registry: &SchemaRegistry,
        metrics: &dyn LayoutMetrics,
    ) -> Result<Self, TreeError> {
        Self::decode(value, registry, metrics, 0)
    }

    /// Parse a node from a JSON string. See [`BlockNode::from_json`].
    pub fn from_json_str(
        json: &str,
        registry: &SchemaRegistry,
        metrics: &dyn LayoutMetrics,
    ) -> Result<Self, TreeError> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| TreeError::MalformedInput(e.to_string()))?;
        Self::from_json(&value, registry, metrics)
    }

    fn decode(
        value: &Value,
        registry: &SchemaRegistry,
        metrics: &dyn LayoutMetrics,
        depth: usize,
    ) -> Result<Self, TreeError> {
        if depth > MAX_NESTING_DEPTH {
            return Err(TreeError::MalformedInput(format!(
                "Nesting deeper than {} levels",
                MAX_NESTING_DEPTH
            )));
        }

        let object = value
            .as_object()
            .ok_or_else(|| TreeError::MalformedInput(format!("Expected a block object, got {}", value)))?;
        let id = object
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| TreeError::MalformedInput("Block object without a string id".into()))?;
        let schema = registry
            .lookup(id)
            .ok_or_else(|| TreeError::UnknownSchema(id.to_string()))?;

        let params = entries(object, "params", id)?;
        let blocks = entries(object, "blocks", id)?;
        if params.len() != schema.code_slot_count() {
            return Err(TreeError::MalformedInput(format!(
                "'{}' declares {} sockets but got {} params",
                id,
                schema.code_slot_count(),
                params.len()
            )));
        }
        if blocks.len() != schema.sequence_line_count() {
            return Err(TreeError::MalformedInput(format!(
                "'{}' declares {} sequences but got {} blocks",
                id,
                schema.sequence_line_count(),
                blocks.len()
            )));
        }

        let mut node = BlockNode::empty(schema);
        let node_id = node.id;
        let mut params = params.iter();
        let mut blocks = blocks.iter();

        for line in 0..node.lines.len() {
            if node.schema.is_sequence_line(line) {
                let items = blocks
                    .next()
                    .and_then(Value::as_array)
                    .ok_or_else(|| TreeError::MalformedInput(format!("'{}' blocks entry must be an array", id)))?;
                let mut seq = BlockSequence::new();
                for item in items {
                    seq.push(Self::decode(item, registry, metrics, depth + 1)?, node_id);
                }
                node.lines[line] = LineContent::Sequence(seq);
                continue;
            }

            for column in 0..node.schema.columns_in_line(line) {
                let accepted = match node.schema.slot(line, column) {
                    Some(slot) if slot.is_code() => slot.accepted_type(),
                    _ => continue,
                };
                let entry = params
                    .next()
                    .ok_or_else(|| TreeError::MalformedInput(format!("'{}' ran out of params", id)))?;
                let content = match entry {
                    Value::Object(_) => {
                        let mut child = Self::decode(entry, registry, metrics, depth + 1)?;
                        child.parent = Some(node_id);
                        SlotContent::Child(Box::new(child))
                    }
                    Value::String(literal) if literal.is_empty() => SlotContent::Empty,
                    Value::String(literal) if accepted != ValueType::None => {
                        SlotContent::Literal(literal.clone())
                    }
                    Value::String(literal) => {
                        warn!(schema = id, line, column, literal = %literal, "dropping literal on a socket that takes none");
                        SlotContent::Empty
                    }
                    other => {
                        return Err(TreeError::MalformedInput(format!(
                            "'{}' param at line {} column {} must be an object or string, got {}",
                            id, line, column, other
                        )))
                    }
                };
                if let Some(slot) = node.slot_mut(line, column) {
                    *slot = content;
                }
            }
        }

        node.recalculate_size(metrics);
        if depth == 0 {
            debug!(schema = id, width = node.width, height = node.height, "block tree loaded");
        }
        Ok(node)
    }
}

/// Entries of an optional array field; absence means an empty list
fn entries<'a>(object: &'a Map<String, Value>, key: &str, id: &str) -> Result<&'a [Value], TreeError> {
    match object.get(key) {
        None => Ok(&[][..]),
        Some(Value::Array(items)) => Ok(items.as_slice()),
        Some(other) => Err(TreeError::MalformedInput(format!(
            "'{}' field '{}' must be an array, got {}",
            id, key, other
        ))),
    }
}

impl Serialize for BlockNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl BlockSequence {
    /// Serialize as an array of node objects
    pub fn to_json(&self) -> Value {
        Value::Array(self.elements.iter().map(BlockNode::to_json).collect())
    }

    /// Rebuild a sequence from an array of node objects, owned by `parent`
    ///
    /// The first failing element aborts the whole sequence.
    pub fn from_json(
        value: &Value,
        registry: &SchemaRegistry,
        parent: ContainerId,
        metrics: &dyn LayoutMetrics,
    ) -> Result<Self, TreeError> {
        let items = value
            .as_array()
            .ok_or_else(|| TreeError::MalformedInput(format!("Expected an array of blocks, got {}", value)))?;
        let mut seq = BlockSequence::new();
        for item in items {
            seq.push(BlockNode::from_json(item, registry, metrics)?, parent);
        }
        Ok(seq)
    }
}

impl Serialize for BlockSequence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
