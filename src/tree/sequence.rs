//! Block sequence: an ordered list of sibling statements
//!
//! Used for every sequence line of a block and for the workspace root. The
//! sequence has no schema or identity of its own; the node or workspace
//! holding it is the parent of its elements and recalculates its own size
//! after any change made here.

use tracing::debug;

use super::node::BlockNode;
use super::{Detached, InsertOutcome, Removal, Step, TreePath};
use crate::core::ContainerId;
use crate::core::schema::ValueType;
use crate::layout::LayoutMetrics;

/// Ordered, owned list of block nodes at one nesting level
#[derive(Debug, Default, PartialEq)]
pub struct BlockSequence {
    pub(crate) elements: Vec<BlockNode>,
}

impl BlockSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&BlockNode> {
        self.elements.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BlockNode> {
        self.elements.iter()
    }

    /// Aggregate width: the widest element
    pub fn width(&self) -> f32 {
        self.elements.iter().fold(0.0, |w, e| w.max(e.width))
    }

    /// Aggregate height: element heights plus the vertical gap between them
    pub fn height(&self, metrics: &dyn LayoutMetrics) -> f32 {
        if self.elements.is_empty() {
            return 0.0;
        }
        let gaps = (self.elements.len() - 1) as f32 * metrics.config().element_padding_vertical;
        self.elements.iter().map(|e| e.height).sum::<f32>() + gaps
    }

    /// Vertical offset of element `index` from the top of the sequence
    pub fn element_top(&self, index: usize, metrics: &dyn LayoutMetrics) -> f32 {
        let gap = metrics.config().element_padding_vertical;
        self.elements
            .iter()
            .take(index)
            .map(|e| e.height + gap)
            .sum()
    }

    /// Recompute the geometry cache of every element subtree
    pub fn relayout(&mut self, metrics: &dyn LayoutMetrics) {
        for element in &mut self.elements {
            element.relayout(metrics);
        }
    }

    /// Append a node, making `parent` its owner
    pub(crate) fn push(&mut self, mut node: BlockNode, parent: ContainerId) {
        node.parent = Some(parent);
        self.elements.push(node);
    }

    /// Insert a node at `index` (clamped to the end), making `parent` its owner
    pub(crate) fn insert(&mut self, index: usize, mut node: BlockNode, parent: ContainerId) {
        node.parent = Some(parent);
        let index = index.min(self.elements.len());
        self.elements.insert(index, node);
    }

    /// Detach element `index`
    pub(crate) fn remove(&mut self, index: usize) -> Option<BlockNode> {
        if index >= self.elements.len() {
            return None;
        }
        let mut node = self.elements.remove(index);
        node.parent = None;
        Some(node)
    }

    /// Find the element whose vertical span contains `y` and whose width
    /// covers `x`. Returns the element index and the point in its coordinates.
    fn element_at(&self, x: f32, y: f32, metrics: &dyn LayoutMetrics) -> Option<(usize, f32, f32)> {
        if self.elements.is_empty() || x < 0.0 || y < 0.0 {
            return None;
        }
        let gap = metrics.config().element_padding_vertical;
        let mut bottom = 0.0;
        for (i, element) in self.elements.iter().enumerate() {
            bottom += element.height;
            if bottom >= y {
                return (element.width >= x).then(|| (i, x, y - (bottom - element.height)));
            }
            bottom += gap;
            if bottom >= y {
                return None;
            }
        }
        None
    }

    /// Locate the innermost editable socket at the point. See [`BlockNode::value_type_at`].
    pub(crate) fn locate_field(&self, x: f32, y: f32, metrics: &dyn LayoutMetrics, path: &mut Vec<Step>) -> bool {
        let Some((index, x, y)) = self.element_at(x, y, metrics) else {
            return false;
        };
        path.push(Step::Element { index });
        if self.elements[index].locate_field(x, y, metrics, path) {
            return true;
        }
        path.pop();
        false
    }

    /// Locate the node a drag starting at the point would pick up
    pub(crate) fn locate_removal(&self, x: f32, y: f32, metrics: &dyn LayoutMetrics, path: &mut Vec<Step>) -> bool {
        let Some((index, x, y)) = self.element_at(x, y, metrics) else {
            return false;
        };
        path.push(Step::Element { index });
        if self.elements[index].locate_removal(x, y, metrics, path) {
            return true;
        }
        path.pop();
        false
    }

    /// Literal type accepted by the socket at the point, `ValueType::None` if there is none
    pub fn value_type_at(&self, x: f32, y: f32, metrics: &dyn LayoutMetrics) -> ValueType {
        let mut path = Vec::new();
        if !self.locate_field(x, y, metrics, &mut path) {
            return ValueType::None;
        }
        self.field_type(&path)
    }

    /// Literal held by the socket at the point
    pub fn value_at(&self, x: f32, y: f32, metrics: &dyn LayoutMetrics) -> Option<&str> {
        let mut path = Vec::new();
        if !self.locate_field(x, y, metrics, &mut path) {
            return None;
        }
        self.field_value(&path)
    }

    /// Set the literal of the socket at the point. Returns whether a socket was updated.
    ///
    /// The owner of this sequence must recalculate its size afterwards.
    pub fn set_value_at(&mut self, value: &str, x: f32, y: f32, metrics: &dyn LayoutMetrics) -> bool {
        let mut path = Vec::new();
        if !self.locate_field(x, y, metrics, &mut path) {
            return false;
        }
        self.set_field(&path, value, metrics)
    }

    pub(crate) fn field_type(&self, path: &[Step]) -> ValueType {
        match path.split_first() {
            Some((Step::Element { index }, rest)) => self
                .elements
                .get(*index)
                .map_or(ValueType::None, |e| e.field_type(rest)),
            _ => ValueType::None,
        }
    }

    pub(crate) fn field_value(&self, path: &[Step]) -> Option<&str> {
        match path.split_first() {
            Some((Step::Element { index }, rest)) => self.elements.get(*index)?.field_value(rest),
            _ => None,
        }
    }

    pub(crate) fn set_field(&mut self, path: &[Step], value: &str, metrics: &dyn LayoutMetrics) -> bool {
        match path.split_first() {
            Some((Step::Element { index }, rest)) => match self.elements.get_mut(*index) {
                Some(element) => element.set_field(rest, value, metrics),
                None => false,
            },
            _ => false,
        }
    }

    /// Remove the node at the point, remembering where it came from
    ///
    /// The owner of this sequence must recalculate its size afterwards.
    pub fn take_at(&mut self, x: f32, y: f32, metrics: &dyn LayoutMetrics) -> Option<Detached> {
        let mut path = Vec::new();
        if !self.locate_removal(x, y, metrics, &mut path) {
            return None;
        }
        let node = self.detach(&path, metrics)?;
        debug!(schema = node.schema_id(), depth = path.len(), "detached block");
        Some(Detached {
            node,
            origin: TreePath(path),
        })
    }

    /// Remove the node at the point. See [`BlockSequence::take_at`].
    pub fn remove_at(&mut self, x: f32, y: f32, metrics: &dyn LayoutMetrics) -> Option<BlockNode> {
        self.take_at(x, y, metrics).map(|d| d.node)
    }

    pub(crate) fn detach(&mut self, path: &[Step], metrics: &dyn LayoutMetrics) -> Option<BlockNode> {
        match path.split_first() {
            Some((Step::Element { index }, [])) => self.remove(*index),
            Some((Step::Element { index }, rest)) => {
                match self.elements.get_mut(*index)?.detach(rest, metrics) {
                    Removal::Detached(node) => Some(node),
                    Removal::Whole | Removal::Miss => None,
                }
            }
            _ => None,
        }
    }

    /// Put `node` back at a location recorded by [`BlockSequence::take_at`]
    ///
    /// Hands the node back if the location no longer exists or is occupied.
    /// The owner of this sequence must recalculate its size afterwards.
    pub fn restore(
        &mut self,
        origin: &TreePath,
        node: BlockNode,
        parent: ContainerId,
        metrics: &dyn LayoutMetrics,
    ) -> Result<(), BlockNode> {
        self.attach(&origin.0, node, parent, metrics)
    }

    pub(crate) fn attach(
        &mut self,
        path: &[Step],
        node: BlockNode,
        parent: ContainerId,
        metrics: &dyn LayoutMetrics,
    ) -> Result<(), BlockNode> {
        match path.split_first() {
            Some((Step::Element { index }, [])) => {
                self.insert(*index, node, parent);
                Ok(())
            }
            Some((Step::Element { index }, rest)) => match self.elements.get_mut(*index) {
                Some(element) => element.attach(rest, node, metrics),
                None => Err(node),
            },
            _ => Err(node),
        }
    }

    /// Drop `candidate` at the point
    ///
    /// Each element is offered the drop in turn; the first one reporting the
    /// point above itself gets the candidate as its predecessor. If every
    /// element reports the point below, the candidate is appended. The owner of
    /// this sequence must recalculate its size afterwards.
    pub fn insert_at(
        &mut self,
        candidate: BlockNode,
        x: f32,
        y: f32,
        parent: ContainerId,
        metrics: &dyn LayoutMetrics,
    ) {
        self.insert_at_depth(candidate, x, y, parent, 0, metrics);
    }

    /// [`BlockSequence::insert_at`] for a sequence whose elements sit `depth`
    /// levels below the root
    pub(crate) fn insert_at_depth(
        &mut self,
        candidate: BlockNode,
        x: f32,
        y: f32,
        parent: ContainerId,
        depth: usize,
        metrics: &dyn LayoutMetrics,
    ) {
        let gap = metrics.config().element_padding_vertical;
        let mut candidate = candidate;
        let mut top = 0.0;
        for i in 0..self.elements.len() {
            match self.elements[i].insert_at_depth(candidate, x, y - top, depth, metrics) {
                InsertOutcome::Inserted => return,
                InsertOutcome::Above(node) => {
                    self.insert(i, node, parent);
                    return;
                }
                InsertOutcome::Below(node) => candidate = node,
            }
            top += self.elements[i].height + gap;
        }
        self.push(candidate, parent);
    }
}
