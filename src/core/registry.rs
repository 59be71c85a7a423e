//! Schema Registry - Central registry for every block kind the editor knows
//!
//! The registry is an explicitly constructed object handed to the tree and the
//! workspace; there is no ambient global. It supports:
//! - Schema registration and unregistration
//! - Lookup by id (used by deserialization)
//! - Discovery by category or search query
//! - Flipping the deprecation flag of a schema

use crate::core::schema::BlockSchema;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of block schemas
///
/// The registry uses `Arc<RwLock<HashMap>>` so clones share the same schema
/// table. Schemas themselves are handed out as `Arc<BlockSchema>` and shared
/// by every block node of that kind.
#[derive(Clone, Default)]
pub struct SchemaRegistry {
    schemas: Arc<RwLock<HashMap<String, Arc<BlockSchema>>>>,
}

impl SchemaRegistry {
    /// Create a new empty schema registry
    ///
    /// # Example
    /// ```
    /// use block_editor::core::registry::SchemaRegistry;
    ///
    /// let registry = SchemaRegistry::new();
    /// assert_eq!(registry.count(), 0);
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new schema
    ///
    /// # Returns
    /// * `Ok(Arc<BlockSchema>)` with the shared handle if registration succeeds
    /// * `Err(RegistryError)` if the id already exists or validation fails
    pub fn register(&self, schema: BlockSchema) -> Result<Arc<BlockSchema>, RegistryError> {
        schema.validate().map_err(RegistryError::ValidationError)?;

        let mut schemas = self.schemas.write();
        if schemas.contains_key(schema.id()) {
            return Err(RegistryError::DuplicateSchema(schema.id().to_string()));
        }

        let schema = Arc::new(schema);
        schemas.insert(schema.id().to_string(), Arc::clone(&schema));
        Ok(schema)
    }

    /// Register several schemas, stopping at the first failure
    pub fn register_all(
        &self,
        schemas: impl IntoIterator<Item = BlockSchema>,
    ) -> Result<(), RegistryError> {
        for schema in schemas {
            self.register(schema)?;
        }
        Ok(())
    }

    /// Unregister a schema. Block nodes already holding it keep their handle.
    pub fn unregister(&self, id: &str) -> Result<(), RegistryError> {
        self.schemas
            .write()
            .remove(id)
            .ok_or_else(|| RegistryError::SchemaNotFound(id.to_string()))?;
        Ok(())
    }

    /// Get a schema by its id
    pub fn get(&self, id: &str) -> Result<Arc<BlockSchema>, RegistryError> {
        self.lookup(id)
            .ok_or_else(|| RegistryError::SchemaNotFound(id.to_string()))
    }

    /// Get a schema by its id, `None` when it is not registered
    pub fn lookup(&self, id: &str) -> Option<Arc<BlockSchema>> {
        self.schemas.read().get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.schemas.read().contains_key(id)
    }

    pub fn count(&self) -> usize {
        self.schemas.read().len()
    }

    pub fn clear(&self) {
        self.schemas.write().clear();
    }

    /// Flip the deprecation flag of one schema
    pub fn set_deprecated(&self, id: &str, deprecated: bool) -> Result<(), RegistryError> {
        self.get(id)?.set_deprecated(deprecated);
        Ok(())
    }

    /// Mark every registered schema as deprecated
    ///
    /// Used before re-importing a catalogue: schemas present in the new
    /// catalogue are registered fresh, the rest stay loadable but hidden.
    pub fn set_all_deprecated(&self) {
        for schema in self.schemas.read().values() {
            schema.set_deprecated(true);
        }
    }

    /// All schemas, sorted by id, optionally skipping deprecated ones
    pub fn all(&self, only_non_deprecated: bool) -> Vec<Arc<BlockSchema>> {
        let mut result: Vec<_> = self
            .schemas
            .read()
            .values()
            .filter(|s| !only_non_deprecated || !s.is_deprecated())
            .cloned()
            .collect();
        result.sort_by(|a, b| a.id().cmp(b.id()));
        result
    }

    /// Schemas in the given category, sorted by id
    pub fn by_category(&self, category: usize) -> Vec<Arc<BlockSchema>> {
        let mut result: Vec<_> = self
            .schemas
            .read()
            .values()
            .filter(|s| s.category() == category)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.id().cmp(b.id()));
        result
    }

    /// Search schemas by id or display name (case-insensitive)
    pub fn search(&self, query: &str) -> Vec<Arc<BlockSchema>> {
        let query = query.to_lowercase();
        let mut result: Vec<_> = self
            .schemas
            .read()
            .values()
            .filter(|s| {
                s.id().to_lowercase().contains(&query) || s.name().to_lowercase().contains(&query)
            })
            .cloned()
            .collect();
        result.sort_by(|a, b| a.id().cmp(b.id()));
        result
    }
}

impl std::fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("count", &self.count())
            .finish()
    }
}

/// Registry error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Schema with given id was not found
    #[error("Schema not found: {0}")]
    SchemaNotFound(String),

    /// Attempted to register a schema with a duplicate id
    #[error("Duplicate schema id: {0}")]
    DuplicateSchema(String),

    /// Schema validation failed
    #[error("Validation error: {0}")]
    ValidationError(String),
}
