//! Validation of the tenant reference.

use super::rule::ScopeRule;
use crate::error::ValidationError;
use crate::tenant::TenantContext;
use crate::types::TenantOwned;

/// Validates the tenant reference of an instance on every validation pass.
///
/// Checks, in order:
///
/// 1. **Immutable** - with `immutable`, a persisted non-null reference may
///    not be changed to a different value (clearing it counts as a change).
/// 2. **Ownership** - with `strict_ownership` and an active tenant, the
///    reference must be that tenant.
/// 3. **Presence** - unless `optional`, the reference must be set.
///
/// Returns every failure found; an empty vector means the reference is valid.
pub fn validate_tenant<D>(rule: &ScopeRule, instance: &D, ctx: &TenantContext) -> Vec<ValidationError>
where
    D: TenantOwned + ?Sized,
{
    let field = rule.tenant_field();
    let value = instance.tenant_ref(field);
    let mut errors = Vec::new();

    if rule.immutable()
        && let Some(persisted) = instance.persisted_tenant_ref(field)
        && value.as_ref() != Some(&persisted)
    {
        errors.push(ValidationError::immutable(field));
    }

    if rule.options().strict_ownership
        && let (Some(value), Some(active)) = (value.as_ref(), ctx.tenant())
        && *value != active.to_value()
    {
        errors.push(ValidationError::ownership(field));
    }

    if !rule.optional() && value.is_none() {
        errors.push(ValidationError::presence(field));
    }

    errors
}
