//! Default query filter for tenant-aware entity types.

use serde_json::Value;

use super::registry::ScopeRegistry;
use super::rule::ScopeRule;
use crate::error::{ScopeResult, TenantNotSetError};
use crate::tenant::TenantContext;
use crate::types::Filter;

/// Builds the filter that scopes every query on the rule's entity type.
///
/// | Context | `optional` | `force_tenant` | Result |
/// |---------|------------|----------------|--------|
/// | tenant T | false | - | `field == T` |
/// | tenant T | true | - | `field in [T, null]` |
/// | no tenant, tenant-less not allowed | - | true | `TenantNotSetError` |
/// | no tenant, otherwise | - | - | `Filter::All` |
///
/// # Errors
///
/// Returns [`TenantNotSetError`] for a forced-tenant type queried with no
/// tenant while tenant-less access is not allowed.
pub fn tenant_filter(rule: &ScopeRule, ctx: &TenantContext) -> Result<Filter, TenantNotSetError> {
    match ctx.tenant() {
        Some(tenant) if rule.optional() => Ok(Filter::in_set(
            rule.tenant_field(),
            vec![tenant.to_value(), Value::Null],
        )),
        Some(tenant) => Ok(Filter::eq(rule.tenant_field(), tenant.to_value())),
        None if rule.force_tenant() && !ctx.allows_no_tenant() => {
            tracing::warn!(
                entity_type = %rule.entity_type(),
                "Rejected query without a tenant on forced-tenant type"
            );
            Err(TenantNotSetError {
                entity_type: rule.entity_type().to_string(),
            })
        }
        None => Ok(Filter::All),
    }
}

/// A query under construction against one entity type.
///
/// The caller's filter is accumulated with AND; the tenant filter is added
/// when the criteria is resolved, reading the context at that moment, so a
/// criteria built outside a scope and resolved inside one is scoped correctly.
///
/// # Examples
///
/// ```
/// use helios_tenancy::backends::memory::InMemoryStore;
/// use helios_tenancy::scope::{ScopeOptions, ScopeRegistryBuilder};
/// use helios_tenancy::tenant::{TenantContext, TenantId};
/// use helios_tenancy::types::Filter;
/// use serde_json::json;
///
/// let store = InMemoryStore::new();
/// let mut builder = ScopeRegistryBuilder::new(&store);
/// builder.register_tenant_scope("Invoice", "account", ScopeOptions::default()).unwrap();
/// let registry = builder.build();
///
/// let criteria = registry.criteria("Invoice").filter(Filter::eq("status", "open"));
/// let filter = TenantContext::with_tenant(Some(TenantId::new("acme")), false, || {
///     criteria.resolve()
/// })
/// .unwrap();
///
/// assert_eq!(
///     filter.to_query_document(),
///     json!({"$and": [{"status": "open"}, {"account_id": "acme"}]})
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Criteria<'r> {
    registry: &'r ScopeRegistry,
    entity_type: String,
    filter: Filter,
    unscoped: bool,
}

impl<'r> Criteria<'r> {
    pub(crate) fn new(registry: &'r ScopeRegistry, entity_type: impl Into<String>) -> Self {
        Self {
            registry,
            entity_type: entity_type.into(),
            filter: Filter::All,
            unscoped: false,
        }
    }

    /// Returns the entity type queried.
    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    /// ANDs a caller filter into the criteria.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = self.filter.and(filter);
        self
    }

    /// Bypasses the default tenant filter.
    pub fn unscoped(mut self) -> Self {
        self.unscoped = true;
        self
    }

    /// Returns `true` if the default tenant filter is bypassed.
    pub fn is_unscoped(&self) -> bool {
        self.unscoped
    }

    /// Resolves the final filter against the ambient tenant context.
    pub fn resolve(&self) -> ScopeResult<Filter> {
        self.resolve_with(&TenantContext::ambient())
    }

    /// Resolves the final filter against an explicit context.
    pub fn resolve_with(&self, ctx: &TenantContext) -> ScopeResult<Filter> {
        if self.unscoped {
            return Ok(self.filter.clone());
        }
        let default = self.registry.default_filter(&self.entity_type, ctx)?;
        Ok(self.filter.clone().and(default))
    }
}
