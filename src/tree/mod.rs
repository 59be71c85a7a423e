//! Block tree: nodes, sequences and the container protocol
//!
//! A program is a tree of [`BlockNode`]s. Slot lines hold literals or child
//! nodes in typed sockets; sequence lines hold a [`BlockSequence`] of nested
//! statements. Ownership flows strictly parent → child; each node keeps only a
//! [`ContainerId`](crate::core::ContainerId) handle of its parent for identity.
//!
//! Every mutation descends from the owner of the tree through `&mut` borrows,
//! so each ancestor on the call path recalculates its cached geometry as the
//! recursion unwinds. That is how size invalidation propagates upward.

pub mod codec;
pub mod draw;
pub mod edit;
pub mod node;
pub mod sequence;

pub use node::{BlockNode, SlotContent};
pub use sequence::BlockSequence;

use crate::layout::LayoutMetrics;

/// Capability of everything that owns block nodes: a block node or the
/// workspace root
///
/// Owners are never reached through the parent handle a node keeps; that
/// handle is only compared against the owner's inherent `id()`. Mutations
/// call `recalculate_size` on each owner along their `&mut` path instead.
pub trait Container {
    /// Recompute cached geometry from structure
    ///
    /// Returns whether width or height changed.
    fn recalculate_size(&mut self, metrics: &dyn LayoutMetrics) -> bool;
}

/// Where a dropped candidate ended up relative to a node
#[derive(Debug)]
pub enum InsertOutcome {
    /// The candidate now lives inside the node
    Inserted,
    /// The drop point lies above the node; the candidate is handed back
    Above(BlockNode),
    /// The drop point lies below the node; the candidate is handed back
    Below(BlockNode),
}

impl InsertOutcome {
    pub fn is_inserted(&self) -> bool {
        matches!(self, InsertOutcome::Inserted)
    }

    /// The rejected candidate, if it was not inserted
    pub fn into_rejected(self) -> Option<BlockNode> {
        match self {
            InsertOutcome::Inserted => None,
            InsertOutcome::Above(node) | InsertOutcome::Below(node) => Some(node),
        }
    }
}

/// Result of removing at a position inside a node
#[derive(Debug)]
pub enum Removal {
    /// The position hit nothing removable
    Miss,
    /// The position hit the node's own chrome; its owner must detach it
    Whole,
    /// A descendant was detached and is handed over, parentless
    Detached(BlockNode),
}

/// One step from a node (or root sequence) down towards a descendant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// Socket at `(line, column)` of the current node
    Slot { line: usize, column: usize },
    /// Sequence held by `line` of the current node
    Sequence { line: usize },
    /// Element `index` of the current sequence
    Element { index: usize },
}

/// Structural location of a node inside a tree, relative to a root sequence
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TreePath(pub(crate) Vec<Step>);

impl TreePath {
    /// Number of nesting steps from the root
    pub fn depth(&self) -> usize {
        self.0.len()
    }
}

/// A node removed from a tree together with the place it came from
#[derive(Debug)]
pub struct Detached {
    pub node: BlockNode,
    pub origin: TreePath,
}

/// Errors raised while rebuilding a tree from serialized data
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// The schema id is not registered
    #[error("Unknown schema: {0}")]
    UnknownSchema(String),

    /// The serialized shape does not match the schema
    #[error("Malformed input: {0}")]
    MalformedInput(String),
}
