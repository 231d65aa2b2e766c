//! Entity instances as seen by the engine.
//!
//! The engine never owns persistence. It only needs to read and assign the
//! tenant reference of an instance and to compare it with the value that was
//! last persisted. [`TenantOwned`] captures exactly that; [`Document`] is the
//! schemaless implementation used by the in-memory store and by hosts that
//! map records to JSON objects.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::tenant::{Tenant, TenantId};

/// Access to the tenant reference of an entity instance.
///
/// References are raw stored values. Any non-null value counts as set, so a
/// host that keys tenants by number or by an object ID is handled the same
/// way as one that uses strings.
pub trait TenantOwned {
    /// Returns the value currently stored in `field`, or `None` if unset or null.
    fn tenant_ref(&self, field: &str) -> Option<Value>;

    /// Returns the value `field` held when the instance was last persisted.
    ///
    /// New instances return `None`.
    fn persisted_tenant_ref(&self, field: &str) -> Option<Value>;

    /// Assigns `tenant` to `field`.
    fn assign_tenant(&mut self, field: &str, tenant: &TenantId);
}

/// A schemaless entity instance.
///
/// # Examples
///
/// ```
/// use helios_tenancy::types::Document;
/// use serde_json::json;
///
/// let invoice = Document::new("Invoice")
///     .with_field("number", "INV-001")
///     .with_field("total", 120);
///
/// assert_eq!(invoice.get("number"), Some(&json!("INV-001")));
/// assert!(!invoice.is_persisted());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    entity_type: String,
    id: String,
    #[serde(default)]
    fields: Map<String, Value>,
    #[serde(skip)]
    persisted: Option<Map<String, Value>>,
}

impl Document {
    /// Creates a new, unpersisted document with a generated ID.
    pub fn new(entity_type: impl Into<String>) -> Self {
        Self::with_id(entity_type, uuid::Uuid::new_v4().to_string())
    }

    /// Creates a new, unpersisted document with the given ID.
    pub fn with_id(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            id: id.into(),
            fields: Map::new(),
            persisted: None,
        }
    }

    /// Sets a field and returns the document.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Returns the entity type of this document.
    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    /// Returns the document ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the field value, `Some(Value::Null)` for an explicit null.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Sets a field.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Removes a field, returning its previous value.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    /// Returns all fields.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Returns `true` once the document has been written by a store.
    pub fn is_persisted(&self) -> bool {
        self.persisted.is_some()
    }

    /// Returns the value of `name` as of the last write, if persisted.
    pub fn persisted_value(&self, name: &str) -> Option<&Value> {
        self.persisted.as_ref().and_then(|p| p.get(name))
    }

    /// Returns `true` if `name` differs from its persisted value.
    ///
    /// Every field of an unpersisted document counts as changed.
    pub fn is_changed(&self, name: &str) -> bool {
        match &self.persisted {
            Some(persisted) => non_null(persisted.get(name)) != non_null(self.fields.get(name)),
            None => true,
        }
    }

    /// Records the current field values as persisted. Called by stores after a write.
    pub fn mark_persisted(&mut self) {
        self.persisted = Some(self.fields.clone());
    }

    /// Takes the persisted snapshot from `stored`, the copy currently held by a store.
    ///
    /// Change tracking then compares against what is actually stored rather
    /// than against whatever snapshot the caller's copy carried.
    pub(crate) fn rebase_on(&mut self, stored: &Document) {
        self.persisted = Some(stored.fields.clone());
    }
}

fn non_null(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

impl TenantOwned for Document {
    fn tenant_ref(&self, field: &str) -> Option<Value> {
        non_null(self.get(field)).cloned()
    }

    fn persisted_tenant_ref(&self, field: &str) -> Option<Value> {
        non_null(self.persisted_value(field)).cloned()
    }

    fn assign_tenant(&mut self, field: &str, tenant: &TenantId) {
        self.set(field, tenant.to_value());
    }
}

/// A document stored in a tenant collection (e.g. an account) is itself a
/// tenant identified by its document ID.
impl Tenant for Document {
    fn tenant_id(&self) -> TenantId {
        TenantId::new(self.id.clone())
    }
}
