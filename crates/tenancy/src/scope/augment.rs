//! Registration-time rewriting of index and uniqueness declarations.

use super::rule::ScopeRule;
use crate::types::{IndexDirection, IndexKey, IndexSpec, UniquenessValidator};

/// Puts the tenant field first in an index declared on a tenant-aware type.
///
/// With `full_indexes` off the spec is returned unchanged. If the spec already
/// keys the tenant field it is moved to the front with its own direction;
/// otherwise an ascending tenant key is prepended.
pub fn augment_index(rule: &ScopeRule, mut spec: IndexSpec) -> IndexSpec {
    if !rule.full_indexes() {
        return spec;
    }
    let field = rule.tenant_field();
    let tenant_key = match spec.position(field) {
        Some(0) => return spec,
        Some(pos) => spec.keys.remove(pos),
        None => IndexKey {
            field: field.to_string(),
            direction: IndexDirection::Ascending,
        },
    };
    spec.keys.insert(0, tenant_key);
    spec
}

/// Adds the tenant field to a uniqueness validator's scope so uniqueness is
/// evaluated per tenant.
pub fn augment_uniqueness(rule: &ScopeRule, mut validator: UniquenessValidator) -> UniquenessValidator {
    let field = rule.tenant_field();
    if !validator.scope.iter().any(|s| s == field) {
        validator.scope.push(field.to_string());
    }
    validator
}
