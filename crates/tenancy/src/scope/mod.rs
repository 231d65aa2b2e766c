//! Scope rules and the hooks they drive.
//!
//! A [`ScopeRule`] is attached to an entity type by
//! [`ScopeRegistryBuilder::register_tenant_scope`]. Once the registry is built,
//! the rule drives four independent behaviours:
//!
//! | Hook | Function | When |
//! |------|----------|------|
//! | Query scoping | [`tenant_filter`] | Every query resolved through [`Criteria`] |
//! | Write stamping | [`stamp_tenant`] | Before validation of every write |
//! | Tenant validation | [`validate_tenant`] | Every validation pass |
//! | Index / uniqueness rewriting | [`augment_index`], [`augment_uniqueness`] | Registration time |
//!
//! [`ScopedCollection`] wires the runtime hooks to a
//! [`DocumentStore`](crate::core::DocumentStore).

mod augment;
mod collection;
mod query;
mod registry;
mod rule;
mod validator;
mod write;

pub use augment::{augment_index, augment_uniqueness};
pub use collection::ScopedCollection;
pub use query::{Criteria, tenant_filter};
pub use registry::{ScopeRegistry, ScopeRegistryBuilder};
pub use rule::{ScopeOptions, ScopeRule};
pub use validator::validate_tenant;
pub use write::stamp_tenant;
