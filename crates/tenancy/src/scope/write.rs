//! Before-validation stamping of the tenant reference.

use super::rule::ScopeRule;
use crate::tenant::TenantContext;
use crate::types::TenantOwned;

/// Stamps the active tenant onto an instance before validation.
///
/// The tenant is assigned only when a tenant is active, the rule is not
/// `optional`, and the instance's tenant reference is unset. An existing value
/// is never overwritten, so a caller may deliberately write an instance for
/// another tenant.
///
/// Returns `true` if the instance was stamped.
pub fn stamp_tenant<D>(rule: &ScopeRule, instance: &mut D, ctx: &TenantContext) -> bool
where
    D: TenantOwned + ?Sized,
{
    let Some(tenant) = ctx.tenant() else {
        return false;
    };
    if rule.optional() || instance.tenant_ref(rule.tenant_field()).is_some() {
        return false;
    }

    tracing::debug!(
        entity_type = %rule.entity_type(),
        field = %rule.tenant_field(),
        tenant = %tenant,
        "Stamping tenant on instance"
    );
    instance.assign_tenant(rule.tenant_field(), tenant);
    true
}
