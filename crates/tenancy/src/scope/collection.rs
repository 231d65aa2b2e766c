//! Tenant-scoped access to one entity type in a document store.

use super::query::Criteria;
use super::registry::ScopeRegistry;
use crate::core::DocumentStore;
use crate::error::{ScopeResult, StoreError};
use crate::tenant::TenantContext;
use crate::types::{Document, Filter};

/// A view of one entity type that applies the registry's hooks on every call.
///
/// Reads AND the default tenant filter into the caller's filter. Writes stamp
/// the active tenant and validate the tenant reference before reaching the
/// store. Each call takes one snapshot of the ambient context, so the hooks
/// of a single write always agree.
///
/// Documents passed to [`create`](Self::create) and [`save`](Self::save) must
/// belong to this collection's entity type; [`new_document`](Self::new_document)
/// builds one.
///
/// # Examples
///
/// ```
/// use helios_tenancy::backends::memory::InMemoryStore;
/// use helios_tenancy::scope::{ScopeOptions, ScopeRegistryBuilder};
/// use helios_tenancy::tenant::{TenantContext, TenantId};
/// use helios_tenancy::types::Filter;
///
/// let store = InMemoryStore::new();
/// let mut builder = ScopeRegistryBuilder::new(&store);
/// builder.register_tenant_scope("Invoice", "account", ScopeOptions::default()).unwrap();
/// let registry = builder.build();
/// let invoices = registry.collection(&store, "Invoice");
///
/// TenantContext::with_tenant(Some(TenantId::new("a")), false, || {
///     invoices.create(invoices.new_document().with_field("number", "001")).unwrap();
/// });
///
/// let seen_by_b = TenantContext::with_tenant(Some(TenantId::new("b")), false, || {
///     invoices.find(Filter::All).unwrap()
/// });
/// assert!(seen_by_b.is_empty());
/// ```
pub struct ScopedCollection<'a, S: DocumentStore + ?Sized> {
    registry: &'a ScopeRegistry,
    store: &'a S,
    entity_type: String,
    unscoped: bool,
}

impl<'a, S: DocumentStore + ?Sized> ScopedCollection<'a, S> {
    pub(crate) fn new(registry: &'a ScopeRegistry, store: &'a S, entity_type: &str) -> Self {
        Self {
            registry,
            store,
            entity_type: entity_type.to_string(),
            unscoped: false,
        }
    }

    /// Returns the entity type of this collection.
    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    /// Returns a view that skips the default tenant filter on reads.
    ///
    /// Writes are still stamped and validated.
    pub fn unscoped(mut self) -> Self {
        self.unscoped = true;
        self
    }

    /// Creates an empty document of this entity type.
    pub fn new_document(&self) -> Document {
        Document::new(self.entity_type.clone())
    }

    /// Starts a query against this collection.
    pub fn criteria(&self) -> Criteria<'a> {
        let criteria = self.registry.criteria(&self.entity_type);
        if self.unscoped {
            criteria.unscoped()
        } else {
            criteria
        }
    }

    /// Stamps, validates and inserts a new document.
    ///
    /// # Errors
    ///
    /// * `ScopeError::Validation` - If the tenant reference is invalid
    /// * `ScopeError::Store` - If the store rejects the insert
    pub fn create(&self, mut document: Document) -> ScopeResult<Document> {
        self.prepare(&mut document)?;
        Ok(self.store.insert(document)?)
    }

    /// Stamps, validates and replaces a persisted document.
    ///
    /// The stored copy is looked up through the default tenant filter, so a
    /// document owned by another tenant is reported as missing. Immutability
    /// of the tenant reference is checked against that stored copy, not
    /// against the snapshot carried by `document`.
    ///
    /// # Errors
    ///
    /// * `ScopeError::Store` - `NotPersisted` if `document` was never read from or written
    ///   to a store, `NotFound` if it is not visible in the current scope, or a uniqueness violation
    /// * `ScopeError::Validation` - If the tenant reference is missing or was changed
    /// * `ScopeError::TenantNotSet` - If the lookup runs without a tenant on a forced-tenant type
    pub fn save(&self, mut document: Document) -> ScopeResult<Document> {
        if !document.is_persisted() {
            return Err(StoreError::NotPersisted {
                entity_type: self.entity_type.clone(),
                id: document.id().to_string(),
            }
            .into());
        }
        let stored = self
            .find_by_id(document.id())?
            .ok_or_else(|| StoreError::NotFound {
                entity_type: self.entity_type.clone(),
                id: document.id().to_string(),
            })?;
        document.rebase_on(&stored);

        self.prepare(&mut document)?;
        Ok(self.store.replace(document)?)
    }

    /// Returns the documents matching `filter` visible in the current scope.
    pub fn find(&self, filter: Filter) -> ScopeResult<Vec<Document>> {
        let filter = self.criteria().filter(filter).resolve()?;
        Ok(self.store.find(&self.entity_type, &filter))
    }

    /// Returns the first document matching `filter` visible in the current scope.
    pub fn find_one(&self, filter: Filter) -> ScopeResult<Option<Document>> {
        Ok(self.find(filter)?.into_iter().next())
    }

    /// Returns the document with `id`, if visible in the current scope.
    pub fn find_by_id(&self, id: &str) -> ScopeResult<Option<Document>> {
        Ok(self.find(Filter::All)?.into_iter().find(|d| d.id() == id))
    }

    /// Counts the documents matching `filter` visible in the current scope.
    pub fn count(&self, filter: Filter) -> ScopeResult<usize> {
        let filter = self.criteria().filter(filter).resolve()?;
        Ok(self.store.count(&self.entity_type, &filter))
    }

    /// Deletes the documents matching `filter` visible in the current scope.
    pub fn delete_all(&self, filter: Filter) -> ScopeResult<usize> {
        let filter = self.criteria().filter(filter).resolve()?;
        let deleted = self.store.delete(&self.entity_type, &filter);
        tracing::debug!(
            entity_type = %self.entity_type,
            deleted = deleted,
            "Deleted scoped documents"
        );
        Ok(deleted)
    }

    fn prepare(&self, document: &mut Document) -> ScopeResult<()> {
        let ctx = TenantContext::ambient();
        self.registry
            .before_validation_with(&self.entity_type, document, &ctx);
        self.registry
            .validate_with(&self.entity_type, document, &ctx)?;
        Ok(())
    }
}
