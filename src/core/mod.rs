//! Core schema abstractions and types
//!
//! This module defines block schemas, the value/I-O type system used to decide
//! which blocks may plug into which sockets, and the registry that owns every
//! schema known to the editor.

pub mod schema;
pub mod registry;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for anything that can own block nodes
/// (a block node or a workspace root)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerId(pub Uuid);

impl ContainerId {
    /// Generate a new random container ID
    pub fn new() -> Self {
        ContainerId(Uuid::new_v4())
    }
}

impl Default for ContainerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ContainerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
