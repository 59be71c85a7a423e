//! Block node: one instantiated block in the program tree

use std::sync::Arc;

use tracing::trace;

use super::sequence::BlockSequence;
use super::Container;
use crate::core::schema::{BlockSchema, Slot};
use crate::core::ContainerId;
use crate::layout::{LayoutMetrics, Rect};

/// Content of one slot position
#[derive(Debug, PartialEq)]
pub enum SlotContent {
    /// Nothing plugged in (always the case for labels)
    Empty,
    /// A typed literal entered by the user
    Literal(String),
    /// A nested block
    Child(Box<BlockNode>),
}

impl SlotContent {
    pub fn is_empty(&self) -> bool {
        matches!(self, SlotContent::Empty)
    }

    pub fn child(&self) -> Option<&BlockNode> {
        match self {
            SlotContent::Child(child) => Some(&**child),
            _ => None,
        }
    }

    pub fn literal(&self) -> Option<&str> {
        match self {
            SlotContent::Literal(value) => Some(value.as_str()),
            _ => None,
        }
    }
}

/// Structural content of one schema line
#[derive(Debug, PartialEq)]
pub(crate) enum LineContent {
    Slots(Vec<SlotContent>),
    Sequence(BlockSequence),
}

/// One block instance
///
/// Structure (schema + slot contents + sequences) is the source of truth.
/// `width`, `height` and the per-line sizes are a cache recomputed by
/// [`Container::recalculate_size`].
#[derive(Debug)]
pub struct BlockNode {
    pub(crate) id: ContainerId,
    pub(crate) parent: Option<ContainerId>,
    pub(crate) schema: Arc<BlockSchema>,
    pub(crate) lines: Vec<LineContent>,
    pub(crate) line_widths: Vec<f32>,
    pub(crate) line_heights: Vec<f32>,
    pub(crate) width: f32,
    pub(crate) height: f32,
}

impl BlockNode {
    /// Create a fresh, detached instance of `schema` with empty slots and
    /// empty sequences
    pub fn new(schema: Arc<BlockSchema>, metrics: &dyn LayoutMetrics) -> Self {
        let mut node = Self::empty(schema);
        node.recalculate_size(metrics);
        node
    }

    /// Allocate storage without computing geometry
    pub(crate) fn empty(schema: Arc<BlockSchema>) -> Self {
        let lines: Vec<LineContent> = schema
            .lines()
            .iter()
            .map(|line| {
                if line.is_empty() {
                    LineContent::Sequence(BlockSequence::new())
                } else {
                    LineContent::Slots(line.iter().map(|_| SlotContent::Empty).collect())
                }
            })
            .collect();
        let line_count = lines.len();

        Self {
            id: ContainerId::new(),
            parent: None,
            schema,
            lines,
            line_widths: vec![0.0; line_count],
            line_heights: vec![0.0; line_count],
            width: 0.0,
            height: 0.0,
        }
    }

    pub fn id(&self) -> ContainerId {
        self.id
    }

    /// Handle of the owning container, `None` when detached
    pub fn parent(&self) -> Option<ContainerId> {
        self.parent
    }

    pub fn schema(&self) -> &Arc<BlockSchema> {
        &self.schema
    }

    pub fn schema_id(&self) -> &str {
        self.schema.id()
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn line_width(&self, line: usize) -> f32 {
        self.line_widths.get(line).copied().unwrap_or(0.0)
    }

    pub fn line_height(&self, line: usize) -> f32 {
        self.line_heights.get(line).copied().unwrap_or(0.0)
    }

    /// Vertical offset of `line` from the top of the node
    pub fn line_top(&self, line: usize) -> f32 {
        self.line_heights.iter().take(line).sum()
    }

    /// Content of the slot at `(line, column)`, `None` for sequence lines
    pub fn slot(&self, line: usize, column: usize) -> Option<&SlotContent> {
        match self.lines.get(line)? {
            LineContent::Slots(slots) => slots.get(column),
            LineContent::Sequence(_) => None,
        }
    }

    /// Sequence held by `line`, `None` for slot lines
    pub fn sequence(&self, line: usize) -> Option<&BlockSequence> {
        match self.lines.get(line)? {
            LineContent::Sequence(seq) => Some(seq),
            LineContent::Slots(_) => None,
        }
    }

    pub(crate) fn slot_mut(&mut self, line: usize, column: usize) -> Option<&mut SlotContent> {
        match self.lines.get_mut(line)? {
            LineContent::Slots(slots) => slots.get_mut(column),
            LineContent::Sequence(_) => None,
        }
    }

    pub(crate) fn sequence_mut(&mut self, line: usize) -> Option<&mut BlockSequence> {
        match self.lines.get_mut(line)? {
            LineContent::Sequence(seq) => Some(seq),
            LineContent::Slots(_) => None,
        }
    }

    /// Whether the node holds any child, nested statement or non-empty literal
    pub fn has_content(&self) -> bool {
        self.lines.iter().any(|line| match line {
            LineContent::Sequence(seq) => !seq.is_empty(),
            LineContent::Slots(slots) => slots.iter().any(|slot| match slot {
                SlotContent::Empty => false,
                SlotContent::Literal(value) => !value.is_empty(),
                SlotContent::Child(_) => true,
            }),
        })
    }

    /// Levels of nesting below this node, 0 when it holds no blocks
    pub fn nesting_depth(&self) -> usize {
        let mut deepest = 0;
        for line in &self.lines {
            let below = match line {
                LineContent::Slots(slots) => slots
                    .iter()
                    .filter_map(SlotContent::child)
                    .map(|child| child.nesting_depth() + 1)
                    .max(),
                LineContent::Sequence(seq) => seq.iter().map(|child| child.nesting_depth() + 1).max(),
            };
            deepest = deepest.max(below.unwrap_or(0));
        }
        deepest
    }

    /// Rendered width of the slot at `(line, column)`
    pub(crate) fn slot_width(&self, line: usize, column: usize, metrics: &dyn LayoutMetrics) -> f32 {
        let config = metrics.config();
        match self.schema.slot(line, column) {
            Some(Slot::Text(label)) => metrics.measure_text(label),
            Some(Slot::Code(_)) => match self.slot(line, column) {
                Some(SlotContent::Child(child)) => {
                    child.width + 2.0 * config.element_padding_horizontal
                }
                Some(SlotContent::Literal(value)) if !value.is_empty() => {
                    metrics.measure_text(value) + 2.0 * config.inner_padding_horizontal
                }
                _ => config.empty_field_width,
            },
            None => 0.0,
        }
    }

    /// Rendered height of the slot at `(line, column)`
    pub(crate) fn slot_height(&self, line: usize, column: usize, metrics: &dyn LayoutMetrics) -> f32 {
        let config = metrics.config();
        match self.schema.slot(line, column) {
            Some(Slot::Text(_)) => metrics.text_height(),
            Some(Slot::Code(_)) => match self.slot(line, column) {
                Some(SlotContent::Child(child)) => {
                    child.height + 2.0 * config.element_padding_vertical
                }
                Some(SlotContent::Literal(value)) if !value.is_empty() => {
                    metrics.text_height() + 2.0 * config.inner_padding_vertical
                }
                _ => config.empty_field_height,
            },
            None => 0.0,
        }
    }

    /// Rectangle of the rendered slot field in node-local coordinates
    pub fn slot_bounds(&self, line: usize, column: usize, metrics: &dyn LayoutMetrics) -> Option<Rect> {
        let columns = match self.lines.get(line)? {
            LineContent::Slots(slots) => slots.len(),
            LineContent::Sequence(_) => return None,
        };
        if column >= columns {
            return None;
        }

        let pad = metrics.config().inner_padding_horizontal;
        let x = (0..column).fold(pad, |x, col| x + self.slot_width(line, col, metrics) + pad);
        let width = self.slot_width(line, column, metrics);
        let height = self.slot_height(line, column, metrics);
        let y = self.line_top(line) + (self.line_height(line) - height) / 2.0;
        Some(Rect::new(x, y, width, height))
    }

    /// Rectangle of the child plugged into `(line, column)`, in node-local coordinates
    pub fn child_bounds(&self, line: usize, column: usize, metrics: &dyn LayoutMetrics) -> Option<Rect> {
        let child = self.slot(line, column)?.child()?;
        let slot = self.slot_bounds(line, column, metrics)?;
        let config = metrics.config();
        Some(Rect::new(
            slot.x + config.element_padding_horizontal,
            slot.y + config.element_padding_vertical,
            child.width,
            child.height,
        ))
    }

    /// Top-left corner of the sequence held by `line`, in node-local coordinates
    pub fn sequence_origin(&self, line: usize, metrics: &dyn LayoutMetrics) -> Option<(f32, f32)> {
        self.sequence(line)?;
        let config = metrics.config();
        Some((
            config.rail_width + config.element_padding_horizontal,
            self.line_top(line) + config.element_padding_vertical,
        ))
    }

    /// Recompute the geometry cache of the whole subtree, children first
    ///
    /// Needed after swapping layout metrics; structural mutations already
    /// keep the cache current along their path.
    pub fn relayout(&mut self, metrics: &dyn LayoutMetrics) {
        for line in &mut self.lines {
            match line {
                LineContent::Slots(slots) => {
                    for slot in slots {
                        if let SlotContent::Child(child) = slot {
                            child.relayout(metrics);
                        }
                    }
                }
                LineContent::Sequence(seq) => seq.relayout(metrics),
            }
        }
        self.recalculate_size(metrics);
    }

    /// Height of the closing line under a trailing sequence, 0 otherwise
    pub(crate) fn closing_line_height(&self, metrics: &dyn LayoutMetrics) -> f32 {
        if self.schema.ends_with_sequence() {
            metrics.text_height() + 2.0 * metrics.config().inner_padding_vertical
        } else {
            0.0
        }
    }
}

impl Container for BlockNode {
    fn recalculate_size(&mut self, metrics: &dyn LayoutMetrics) -> bool {
        let config = metrics.config();
        let old_width = self.width;
        let old_height = self.height;

        let mut width: f32 = 0.0;
        let mut height: f32 = 0.0;

        for i in 0..self.lines.len() {
            let (line_width, line_height) = match &self.lines[i] {
                LineContent::Sequence(seq) => (
                    seq.width() + config.element_padding_horizontal + config.rail_width,
                    seq.height(metrics) + 2.0 * config.element_padding_vertical,
                ),
                LineContent::Slots(slots) => {
                    let mut line_width = config.inner_padding_horizontal;
                    let mut line_height: f32 = 0.0;
                    for j in 0..slots.len() {
                        line_height = line_height.max(
                            self.slot_height(i, j, metrics) + 2.0 * config.inner_padding_vertical,
                        );
                        line_width += self.slot_width(i, j, metrics) + config.inner_padding_horizontal;
                    }
                    (line_width, line_height)
                }
            };
            self.line_widths[i] = line_width;
            self.line_heights[i] = line_height;
            width = width.max(line_width);
            height += line_height;
        }

        height += self.closing_line_height(metrics);

        self.width = width;
        self.height = height;

        let changed = old_width != width || old_height != height;
        if changed {
            trace!(
                schema = self.schema.id(),
                width,
                height,
                "block size changed"
            );
        }
        changed
    }
}

/// Structural equality: schema id, literals, children and sequences.
/// Ids, parents and cached geometry are ignored.
impl PartialEq for BlockNode {
    fn eq(&self, other: &Self) -> bool {
        self.schema.id() == other.schema.id() && self.lines == other.lines
    }
}
