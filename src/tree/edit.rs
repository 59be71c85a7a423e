//! Hit-testing and structural mutation of block nodes
//!
//! All position-based operations take a point relative to the node's top-left
//! corner and descend through slot lines, child nodes and sequences. Read-only
//! queries first resolve a [`Step`] path; mutations then follow that path with
//! `&mut` access and recalculate every node on the way back up.
//!
//! Edge policy:
//! - value queries resolve padding, labels and gaps to "no target"
//! - removal resolves padding, labels and the connector rail to the node
//!   itself, so a drag on chrome picks up the whole block
//! - gaps between sequence elements and points right of a line resolve to
//!   nothing for both

use tracing::debug;

use super::codec::MAX_NESTING_DEPTH;
use super::node::{BlockNode, LineContent, SlotContent};
use super::{Container, InsertOutcome, Removal, Step};
use crate::core::schema::{Slot, ValueType};
use crate::layout::LayoutMetrics;

impl BlockNode {
    // ── Geometry helpers ──

    /// Index and top of the first line whose bottom edge reaches `y`
    fn line_at(&self, y: f32) -> Option<(usize, f32)> {
        let mut top = 0.0;
        for (line, height) in self.line_heights.iter().enumerate() {
            if top + height >= y {
                return Some((line, top));
            }
            top += height;
        }
        None
    }

    /// Column of a slot line whose horizontal span contains `x`, with its left edge
    fn column_at(&self, line: usize, x: f32, metrics: &dyn LayoutMetrics) -> Option<(usize, f32)> {
        let pad = metrics.config().inner_padding_horizontal;
        let mut left = pad;
        for column in 0..self.schema.columns_in_line(line) {
            if x < left {
                return None;
            }
            let width = self.slot_width(line, column, metrics);
            if x <= left + width {
                return Some((column, left));
            }
            left += width + pad;
        }
        None
    }

    /// Top of a slot relative to its line (slots are vertically centered)
    fn slot_top(&self, line: usize, column: usize, metrics: &dyn LayoutMetrics) -> f32 {
        (self.line_height(line) - self.slot_height(line, column, metrics)) / 2.0
    }

    /// Offset of a child inside its slot
    fn child_offset(&self, line: usize, column: usize, left: f32, metrics: &dyn LayoutMetrics) -> (f32, f32) {
        let config = metrics.config();
        (
            left + config.element_padding_horizontal,
            self.slot_top(line, column, metrics) + config.element_padding_vertical,
        )
    }

    /// Offset of a sequence inside its line
    fn sequence_offset(metrics: &dyn LayoutMetrics) -> (f32, f32) {
        let config = metrics.config();
        (
            config.rail_width + config.element_padding_horizontal,
            config.element_padding_vertical,
        )
    }

    // ── Locating ──

    /// Resolve the editable socket under the point
    ///
    /// On success `path` ends with the `Step::Slot` of an empty or literal
    /// code socket.
    pub(crate) fn locate_field(&self, x: f32, y: f32, metrics: &dyn LayoutMetrics, path: &mut Vec<Step>) -> bool {
        if x < 0.0 || y < 0.0 || x > self.width || y > self.height {
            return false;
        }
        let Some((line, top)) = self.line_at(y) else {
            return false;
        };
        let y = y - top;

        match &self.lines[line] {
            LineContent::Sequence(seq) => {
                let (dx, dy) = Self::sequence_offset(metrics);
                path.push(Step::Sequence { line });
                if seq.locate_field(x - dx, y - dy, metrics, path) {
                    return true;
                }
                path.pop();
                false
            }
            LineContent::Slots(slots) => {
                let Some((column, left)) = self.column_at(line, x, metrics) else {
                    return false;
                };
                if let SlotContent::Child(child) = &slots[column] {
                    let (dx, dy) = self.child_offset(line, column, left, metrics);
                    path.push(Step::Slot { line, column });
                    if child.locate_field(x - dx, y - dy, metrics, path) {
                        return true;
                    }
                    path.pop();
                    return false;
                }

                let is_code = self.schema.slot(line, column).is_some_and(Slot::is_code);
                let slot_top = self.slot_top(line, column, metrics);
                let slot_bottom = slot_top + self.slot_height(line, column, metrics);
                if is_code && y >= slot_top && y <= slot_bottom {
                    path.push(Step::Slot { line, column });
                    return true;
                }
                false
            }
        }
    }

    /// Resolve the node a drag starting at the point picks up
    ///
    /// Returns `false` for a miss. On success, `path` is extended with the
    /// steps to the innermost hit descendant; no extension means this node.
    pub(crate) fn locate_removal(&self, x: f32, y: f32, metrics: &dyn LayoutMetrics, path: &mut Vec<Step>) -> bool {
        if x <= 0.0 || y <= 0.0 || x >= self.width || y >= self.height {
            return false;
        }
        let Some((line, top)) = self.line_at(y) else {
            // closing line
            return x <= metrics.config().closing_line_width;
        };
        if x > self.line_width(line) {
            return false;
        }
        let y = y - top;

        match &self.lines[line] {
            LineContent::Sequence(seq) => {
                let (dx, dy) = Self::sequence_offset(metrics);
                if x < dx {
                    return true;
                }
                path.push(Step::Sequence { line });
                if seq.locate_removal(x - dx, y - dy, metrics, path) {
                    return true;
                }
                path.pop();
                false
            }
            LineContent::Slots(slots) => {
                let Some((column, left)) = self.column_at(line, x, metrics) else {
                    return true;
                };
                if let SlotContent::Child(child) = &slots[column] {
                    let (dx, dy) = self.child_offset(line, column, left, metrics);
                    path.push(Step::Slot { line, column });
                    if child.locate_removal(x - dx, y - dy, metrics, path) {
                        return true;
                    }
                    path.pop();
                }
                true
            }
        }
    }

    // ── Value queries ──

    /// Literal type accepted by the socket under the point
    ///
    /// # Returns
    /// The socket's accepted value type, or `ValueType::None` when the point
    /// hits no editable socket (labels, padding, output sockets, out of bounds)
    pub fn value_type_at(&self, x: f32, y: f32, metrics: &dyn LayoutMetrics) -> ValueType {
        let mut path = Vec::new();
        if !self.locate_field(x, y, metrics, &mut path) {
            return ValueType::None;
        }
        self.field_type(&path)
    }

    /// Literal currently held by the socket under the point
    pub fn value_at(&self, x: f32, y: f32, metrics: &dyn LayoutMetrics) -> Option<&str> {
        let mut path = Vec::new();
        if !self.locate_field(x, y, metrics, &mut path) {
            return None;
        }
        self.field_value(&path)
    }

    /// Replace the literal of the socket under the point
    ///
    /// An empty `value` clears the socket. Sockets that accept no literal
    /// type are left untouched.
    ///
    /// # Returns
    /// Whether a socket was updated
    pub fn set_value_at(&mut self, value: &str, x: f32, y: f32, metrics: &dyn LayoutMetrics) -> bool {
        let mut path = Vec::new();
        if !self.locate_field(x, y, metrics, &mut path) {
            return false;
        }
        self.set_field(&path, value, metrics)
    }

    pub(crate) fn field_type(&self, path: &[Step]) -> ValueType {
        match path.split_first() {
            Some((&Step::Slot { line, column }, [])) => self.schema.accepted_type_at(line, column),
            Some((&Step::Slot { line, column }, rest)) => self
                .slot(line, column)
                .and_then(SlotContent::child)
                .map_or(ValueType::None, |child| child.field_type(rest)),
            Some((&Step::Sequence { line }, rest)) => self
                .sequence(line)
                .map_or(ValueType::None, |seq| seq.field_type(rest)),
            _ => ValueType::None,
        }
    }

    pub(crate) fn field_value(&self, path: &[Step]) -> Option<&str> {
        match path.split_first() {
            Some((&Step::Slot { line, column }, [])) => self.slot(line, column)?.literal(),
            Some((&Step::Slot { line, column }, rest)) => self.slot(line, column)?.child()?.field_value(rest),
            Some((&Step::Sequence { line }, rest)) => self.sequence(line)?.field_value(rest),
            _ => None,
        }
    }

    pub(crate) fn set_field(&mut self, path: &[Step], value: &str, metrics: &dyn LayoutMetrics) -> bool {
        let updated = match path.split_first() {
            Some((&Step::Slot { line, column }, [])) => {
                let accepted = self.schema.accepted_type_at(line, column);
                match self.slot_mut(line, column) {
                    Some(slot) if accepted != ValueType::None && !matches!(slot, SlotContent::Child(_)) => {
                        *slot = if value.is_empty() {
                            SlotContent::Empty
                        } else {
                            SlotContent::Literal(value.to_string())
                        };
                        debug!(line, column, %accepted, "literal updated");
                        true
                    }
                    _ => false,
                }
            }
            Some((&Step::Slot { line, column }, rest)) => match self.slot_mut(line, column) {
                Some(SlotContent::Child(child)) => child.set_field(rest, value, metrics),
                _ => false,
            },
            Some((&Step::Sequence { line }, rest)) => match self.sequence_mut(line) {
                Some(seq) => seq.set_field(rest, value, metrics),
                None => false,
            },
            _ => false,
        };
        if updated {
            self.recalculate_size(metrics);
        }
        updated
    }

    // ── Removal ──

    /// Remove whatever a drag starting at the point picks up
    ///
    /// # Returns
    /// * `Removal::Detached(node)` if a descendant was detached; it comes back
    ///   parentless and this node's geometry is already recalculated
    /// * `Removal::Whole` if the point hit this node's own chrome; the owner
    ///   of this node must detach it
    /// * `Removal::Miss` if nothing removable is under the point
    pub fn remove_at(&mut self, x: f32, y: f32, metrics: &dyn LayoutMetrics) -> Removal {
        let mut path = Vec::new();
        if !self.locate_removal(x, y, metrics, &mut path) {
            return Removal::Miss;
        }
        self.detach(&path, metrics)
    }

    pub(crate) fn detach(&mut self, path: &[Step], metrics: &dyn LayoutMetrics) -> Removal {
        let removal = match path.split_first() {
            None => return Removal::Whole,
            Some((&Step::Slot { line, column }, [])) => {
                let Some(slot) = self.slot_mut(line, column) else {
                    return Removal::Miss;
                };
                match std::mem::replace(slot, SlotContent::Empty) {
                    SlotContent::Child(mut child) => {
                        child.parent = None;
                        debug!(schema = child.schema_id(), line, column, "detached child");
                        Removal::Detached(*child)
                    }
                    other => {
                        *slot = other;
                        Removal::Miss
                    }
                }
            }
            Some((&Step::Slot { line, column }, rest)) => match self.slot_mut(line, column) {
                Some(SlotContent::Child(child)) => child.detach(rest, metrics),
                _ => Removal::Miss,
            },
            Some((&Step::Sequence { line }, rest)) => {
                match self.sequence_mut(line).and_then(|seq| seq.detach(rest, metrics)) {
                    Some(node) => Removal::Detached(node),
                    None => Removal::Miss,
                }
            }
            Some((&Step::Element { .. }, _)) => Removal::Miss,
        };
        if matches!(removal, Removal::Detached(_)) {
            self.recalculate_size(metrics);
        }
        removal
    }

    /// Re-attach `node` at a path produced by a previous removal
    pub(crate) fn attach(&mut self, path: &[Step], node: BlockNode, metrics: &dyn LayoutMetrics) -> Result<(), BlockNode> {
        let id = self.id;
        match path.split_first() {
            Some((&Step::Slot { line, column }, [])) => {
                let is_code = self.schema.slot(line, column).is_some_and(Slot::is_code);
                match self.slot_mut(line, column) {
                    Some(slot) if is_code && slot.is_empty() => {
                        let mut node = node;
                        node.parent = Some(id);
                        *slot = SlotContent::Child(Box::new(node));
                    }
                    _ => return Err(node),
                }
            }
            Some((&Step::Slot { line, column }, rest)) => match self.slot_mut(line, column) {
                Some(SlotContent::Child(child)) => child.attach(rest, node, metrics)?,
                _ => return Err(node),
            },
            Some((&Step::Sequence { line }, rest)) => match self.sequence_mut(line) {
                Some(seq) => seq.attach(rest, node, id, metrics)?,
                None => return Err(node),
            },
            _ => return Err(node),
        }
        self.recalculate_size(metrics);
        Ok(())
    }

    // ── Insertion ──

    /// Drop `candidate` at the point
    ///
    /// Tries the socket under the point first, then the nested sequences
    /// using the midpoint rule: a drop between two sequence lines goes to the
    /// end of the preceding sequence if it lies at or above the midpoint of
    /// the gap, else to the start of the following one.
    ///
    /// This node is taken as the root of its tree. A drop that would nest the
    /// candidate deeper than [`MAX_NESTING_DEPTH`] is handed back to the owner.
    ///
    /// # Returns
    /// * `InsertOutcome::Inserted` if the candidate now lives in this subtree
    /// * `InsertOutcome::Above(candidate)` / `InsertOutcome::Below(candidate)`
    ///   if the owner should place it before / after this node instead
    ///
    /// # Example
    /// ```
    /// use std::sync::Arc;
    /// use block_editor::core::schema::{BlockSchema, IoKind, Slot, ValueType};
    /// use block_editor::layout::MonospaceMetrics;
    /// use block_editor::tree::BlockNode;
    ///
    /// let metrics = MonospaceMetrics::default();
    /// let add = Arc::new(BlockSchema::new(
    ///     "ADD",
    ///     ValueType::Num,
    ///     ValueType::None,
    ///     vec![vec![Slot::Code(IoKind::NumIn), Slot::Code(IoKind::NumIn)]],
    /// ));
    /// let five = Arc::new(BlockSchema::new(
    ///     "LIT_5",
    ///     ValueType::Num,
    ///     ValueType::None,
    ///     vec![vec![Slot::Text("5".into())]],
    /// ));
    ///
    /// let mut node = BlockNode::new(add, &metrics);
    /// let (x, y) = node.slot_bounds(0, 0, &metrics).unwrap().center();
    /// let outcome = node.insert_at(BlockNode::new(five, &metrics), x, y, &metrics);
    /// assert!(outcome.is_inserted());
    /// ```
    pub fn insert_at(&mut self, candidate: BlockNode, x: f32, y: f32, metrics: &dyn LayoutMetrics) -> InsertOutcome {
        self.insert_at_depth(candidate, x, y, 0, metrics)
    }

    /// [`BlockNode::insert_at`] for a node sitting `depth` levels below the root
    pub(crate) fn insert_at_depth(
        &mut self,
        candidate: BlockNode,
        x: f32,
        y: f32,
        depth: usize,
        metrics: &dyn LayoutMetrics,
    ) -> InsertOutcome {
        if y <= 0.0 {
            return InsertOutcome::Above(candidate);
        }
        if y >= self.height {
            return InsertOutcome::Below(candidate);
        }
        if x < 0.0 {
            return if y < self.height / 2.0 {
                InsertOutcome::Above(candidate)
            } else {
                InsertOutcome::Below(candidate)
            };
        }

        if depth + 1 + candidate.nesting_depth() > MAX_NESTING_DEPTH {
            debug!(
                schema = self.schema.id(),
                candidate = candidate.schema_id(),
                depth,
                "drop exceeds nesting limit"
            );
            return if y < self.height / 2.0 {
                InsertOutcome::Above(candidate)
            } else {
                InsertOutcome::Below(candidate)
            };
        }

        let mut candidate = candidate;
        if let Some((line, top)) = self.line_at(y) {
            match self.insert_into_line(line, candidate, x, y - top, depth, metrics) {
                Ok(()) => {
                    self.recalculate_size(metrics);
                    return InsertOutcome::Inserted;
                }
                Err(rejected) => candidate = rejected,
            }
        }
        self.insert_between_sequences(candidate, y, metrics)
    }

    fn insert_into_line(
        &mut self,
        line: usize,
        candidate: BlockNode,
        x: f32,
        y: f32,
        depth: usize,
        metrics: &dyn LayoutMetrics,
    ) -> Result<(), BlockNode> {
        let id = self.id;
        if let Some(seq) = self.sequence_mut(line) {
            let (dx, dy) = Self::sequence_offset(metrics);
            seq.insert_at_depth(candidate, x - dx, y - dy, id, depth + 1, metrics);
            return Ok(());
        }

        let Some((column, left)) = self.column_at(line, x, metrics) else {
            return Err(candidate);
        };
        match self.slot(line, column) {
            None => return Err(candidate),
            Some(SlotContent::Literal(value)) if !value.is_empty() => return Err(candidate),
            Some(SlotContent::Child(_)) => {
                let (dx, dy) = self.child_offset(line, column, left, metrics);
                return match self.slot_mut(line, column) {
                    Some(SlotContent::Child(child)) => match child.insert_at_depth(candidate, x - dx, y - dy, depth + 1, metrics) {
                        InsertOutcome::Inserted => Ok(()),
                        InsertOutcome::Above(rejected) | InsertOutcome::Below(rejected) => Err(rejected),
                    },
                    _ => Err(candidate),
                };
            }
            _ => {}
        }
        if !self.schema.accepts_at(line, column, candidate.schema()) {
            debug!(
                socket = self.schema.id(),
                candidate = candidate.schema_id(),
                "incompatible connection"
            );
            return Err(candidate);
        }

        let Some(slot) = self.slot_mut(line, column) else {
            return Err(candidate);
        };
        let mut candidate = candidate;
        candidate.parent = Some(id);
        debug!(schema = candidate.schema_id(), line, column, "plugged into socket");
        *slot = SlotContent::Child(Box::new(candidate));
        Ok(())
    }

    fn insert_between_sequences(&mut self, candidate: BlockNode, y: f32, metrics: &dyn LayoutMetrics) -> InsertOutcome {
        let pad = metrics.config().element_padding_vertical;
        let mut previous: Option<usize> = None;
        let mut previous_end = 0.0;
        let mut top = 0.0;

        for line in 0..self.lines.len() {
            let height = self.line_heights[line];
            if matches!(self.lines[line], LineContent::Sequence(_)) {
                if top + height >= y {
                    let midpoint = (previous_end + top + pad) / 2.0;
                    return if y <= midpoint {
                        self.append_to(previous, candidate, metrics)
                    } else {
                        self.prepend_to(line, candidate, metrics)
                    };
                }
                previous = Some(line);
                previous_end = top + height - pad;
            }
            top += height;
        }

        let midpoint = (previous_end + self.height) / 2.0;
        if y <= midpoint {
            self.append_to(previous, candidate, metrics)
        } else {
            InsertOutcome::Below(candidate)
        }
    }

    fn append_to(&mut self, line: Option<usize>, candidate: BlockNode, metrics: &dyn LayoutMetrics) -> InsertOutcome {
        let id = self.id;
        match line.and_then(|line| self.sequence_mut(line)) {
            Some(seq) => {
                seq.push(candidate, id);
                self.recalculate_size(metrics);
                InsertOutcome::Inserted
            }
            None => InsertOutcome::Above(candidate),
        }
    }

    fn prepend_to(&mut self, line: usize, candidate: BlockNode, metrics: &dyn LayoutMetrics) -> InsertOutcome {
        let id = self.id;
        match self.sequence_mut(line) {
            Some(seq) => {
                seq.insert(0, candidate, id);
                self.recalculate_size(metrics);
                InsertOutcome::Inserted
            }
            None => InsertOutcome::Below(candidate),
        }
    }
}
