//! Block Editor - Layout, hit-testing and editing engine for block programs
//!
//! This crate provides the in-memory program tree of a visual block editor:
//! schemas and their type system, block nodes with cached geometry,
//! pointer-driven insertion and removal, JSON (de)serialization, and a
//! workspace root tying them to a drawing surface.

pub mod core;
pub mod layout;
pub mod tree;
pub mod workspace;
mod tests;

// Re-export commonly used types
pub use core::registry::{RegistryError, SchemaRegistry};
pub use core::schema::{BlockSchema, IoKind, Slot, ValueType};
pub use core::ContainerId;
pub use layout::{LayoutConfig, LayoutMetrics, MonospaceMetrics, Rect};
pub use tree::{BlockNode, BlockSequence, Container, InsertOutcome, Removal, SlotContent, TreeError};
pub use workspace::{DragSession, Workspace};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
