//! Per-entity-type scope rules.

use serde::{Deserialize, Serialize};

/// Options accepted by
/// [`register_tenant_scope`](super::ScopeRegistryBuilder::register_tenant_scope).
///
/// Every field has a serde default, so options can be embedded in a host
/// configuration file and only the overrides spelled out.
///
/// # Example
///
/// ```
/// use helios_tenancy::scope::ScopeOptions;
///
/// let options: ScopeOptions = serde_json::from_str(r#"{"force_tenant": true}"#).unwrap();
/// assert!(options.force_tenant);
/// assert!(options.immutable);
/// assert!(options.full_indexes);
/// assert!(!options.optional);
///
/// let same = ScopeOptions::new().force_tenant();
/// assert_eq!(options, same);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeOptions {
    /// Instances may exist without a tenant. Queries then also match
    /// instances whose tenant reference is null.
    pub optional: bool,

    /// Once set, the tenant reference may not be changed.
    pub immutable: bool,

    /// Create a background index on the tenant field alone.
    pub index: bool,

    /// Prepend the tenant field to every index declared on the type.
    pub full_indexes: bool,

    /// Refuse queries that run with no tenant unless tenant-less access is
    /// explicitly allowed.
    pub force_tenant: bool,

    /// Reject instances whose tenant differs from the active tenant.
    ///
    /// Off by default, which allows explicit cross-tenant administrative writes.
    pub strict_ownership: bool,
}

impl Default for ScopeOptions {
    fn default() -> Self {
        Self {
            optional: false,
            immutable: true,
            index: false,
            full_indexes: true,
            force_tenant: false,
            strict_ownership: false,
        }
    }
}

impl ScopeOptions {
    /// Creates options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allows instances without a tenant.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Allows the tenant reference to change after it is set.
    pub fn mutable(mut self) -> Self {
        self.immutable = false;
        self
    }

    /// Requests a background index on the tenant field.
    pub fn indexed(mut self) -> Self {
        self.index = true;
        self
    }

    /// Leaves declared indexes untouched.
    pub fn partial_indexes(mut self) -> Self {
        self.full_indexes = false;
        self
    }

    /// Requires a tenant (or an explicit allowance) for every query.
    pub fn force_tenant(mut self) -> Self {
        self.force_tenant = true;
        self
    }

    /// Rejects instances owned by a tenant other than the active one.
    pub fn strict_ownership(mut self) -> Self {
        self.strict_ownership = true;
        self
    }
}

/// How one entity type relates to its tenant.
///
/// Created once at registration and immutable afterwards. Shared read-only
/// through the [`ScopeRegistry`](super::ScopeRegistry).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeRule {
    pub(crate) entity_type: String,
    pub(crate) association: String,
    pub(crate) tenant_field: String,
    pub(crate) options: ScopeOptions,
    pub(crate) inherited_from: Option<String>,
}

impl ScopeRule {
    /// Returns the entity type this rule applies to.
    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    /// Returns the association naming the tenant type.
    pub fn association(&self) -> &str {
        &self.association
    }

    /// Returns the storage field holding the tenant reference.
    pub fn tenant_field(&self) -> &str {
        &self.tenant_field
    }

    /// Returns the registration options.
    pub fn options(&self) -> &ScopeOptions {
        &self.options
    }

    /// Returns the parent type this rule was inherited from, if any.
    pub fn inherited_from(&self) -> Option<&str> {
        self.inherited_from.as_deref()
    }

    /// Returns `true` if instances may exist without a tenant.
    pub fn optional(&self) -> bool {
        self.options.optional
    }

    /// Returns `true` if the tenant reference is immutable once set.
    pub fn immutable(&self) -> bool {
        self.options.immutable
    }

    /// Returns `true` if queries require a tenant.
    pub fn force_tenant(&self) -> bool {
        self.options.force_tenant
    }

    /// Returns `true` if declared indexes are prefixed with the tenant field.
    pub fn full_indexes(&self) -> bool {
        self.options.full_indexes
    }
}
