//! In-memory store state and the mapper side of the backend.

use std::collections::HashMap;
use std::fmt::Debug;

use parking_lot::RwLock;

use crate::core::Mapper;
use crate::error::MapperError;
use crate::types::{Document, IndexSpec, UniquenessValidator};

#[derive(Debug, Default)]
pub(super) struct Schema {
    /// entity type -> (association, field)
    pub(super) references: HashMap<String, Vec<(String, String)>>,
    pub(super) indexes: HashMap<String, Vec<IndexSpec>>,
    pub(super) validators: HashMap<String, Vec<UniquenessValidator>>,
}

/// Mapper and document store backed by process memory.
///
/// Safe to share between threads. Schema declarations and documents sit
/// behind separate locks, always taken in that order.
#[derive(Default)]
pub struct InMemoryStore {
    pub(super) schema: RwLock<Schema>,
    /// entity type -> documents in insertion order
    pub(super) documents: RwLock<HashMap<String, Vec<Document>>>,
}

impl Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let schema = self.schema.read();
        f.debug_struct("InMemoryStore")
            .field("entity_types", &schema.references.len())
            .field("indexes", &schema.indexes.values().map(Vec::len).sum::<usize>())
            .field("documents", &self.len())
            .finish_non_exhaustive()
    }
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the references declared on `entity_type` as `(association, field)` pairs.
    pub fn references(&self, entity_type: &str) -> Vec<(String, String)> {
        self.schema
            .read()
            .references
            .get(entity_type)
            .cloned()
            .unwrap_or_default()
    }

    /// Returns the indexes created on `entity_type`, in declaration order.
    pub fn indexes(&self, entity_type: &str) -> Vec<IndexSpec> {
        self.schema
            .read()
            .indexes
            .get(entity_type)
            .cloned()
            .unwrap_or_default()
    }

    /// Returns the uniqueness validators registered on `entity_type`.
    pub fn uniqueness_validators(&self, entity_type: &str) -> Vec<UniquenessValidator> {
        self.schema
            .read()
            .validators
            .get(entity_type)
            .cloned()
            .unwrap_or_default()
    }

    /// Returns the number of stored documents across all entity types.
    pub fn len(&self) -> usize {
        self.documents.read().values().map(Vec::len).sum()
    }

    /// Returns `true` if no documents are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every document, keeping schema declarations.
    pub fn clear(&self) {
        self.documents.write().clear();
    }
}

fn rejected(operation: &str, entity_type: &str, message: &str) -> MapperError {
    MapperError::Rejected {
        operation: operation.to_string(),
        entity_type: entity_type.to_string(),
        message: message.to_string(),
    }
}

impl Mapper for InMemoryStore {
    fn declare_reference(
        &self,
        entity_type: &str,
        association: &str,
        field: &str,
    ) -> Result<(), MapperError> {
        let mut schema = self.schema.write();
        let references = schema.references.entry(entity_type.to_string()).or_default();
        if references.iter().any(|(_, f)| f == field) {
            return Ok(());
        }
        references.push((association.to_string(), field.to_string()));
        Ok(())
    }

    fn create_index(&self, entity_type: &str, index: &IndexSpec) -> Result<(), MapperError> {
        if index.keys.is_empty() {
            return Err(rejected("create_index", entity_type, "index has no keys"));
        }
        let mut schema = self.schema.write();
        let indexes = schema.indexes.entry(entity_type.to_string()).or_default();
        if !indexes.contains(index) {
            indexes.push(index.clone());
        }
        Ok(())
    }

    fn register_uniqueness(
        &self,
        entity_type: &str,
        validator: &UniquenessValidator,
    ) -> Result<(), MapperError> {
        if validator.fields.is_empty() {
            return Err(rejected(
                "register_uniqueness",
                entity_type,
                "validator has no fields",
            ));
        }
        self.schema
            .write()
            .validators
            .entry(entity_type.to_string())
            .or_default()
            .push(validator.clone());
        Ok(())
    }
}
