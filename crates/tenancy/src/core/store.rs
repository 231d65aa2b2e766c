//! Host document store surface.

use crate::error::StoreError;
use crate::types::{Document, Filter};

/// Persistence and query execution, provided by the host.
///
/// The engine never calls a store unscoped on its own. A
/// [`ScopedCollection`](crate::scope::ScopedCollection) composes the tenant
/// filter and the write hooks before delegating here.
pub trait DocumentStore: Send + Sync {
    /// Persists a new document.
    ///
    /// # Errors
    ///
    /// * `StoreError::DuplicateKey` - If a uniqueness rule is violated
    fn insert(&self, document: Document) -> Result<Document, StoreError>;

    /// Replaces a persisted document with the same ID.
    ///
    /// # Errors
    ///
    /// * `StoreError::NotFound` - If no document with that ID exists
    /// * `StoreError::DuplicateKey` - If a uniqueness rule is violated
    fn replace(&self, document: Document) -> Result<Document, StoreError>;

    /// Returns all documents of `entity_type` matching `filter`.
    fn find(&self, entity_type: &str, filter: &Filter) -> Vec<Document>;

    /// Deletes all documents of `entity_type` matching `filter`, returning the count.
    fn delete(&self, entity_type: &str, filter: &Filter) -> usize;

    /// Counts documents of `entity_type` matching `filter`.
    fn count(&self, entity_type: &str, filter: &Filter) -> usize {
        self.find(entity_type, filter).len()
    }
}
