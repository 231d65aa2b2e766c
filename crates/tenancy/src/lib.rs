//! Helios Tenancy
//!
//! A tenant-scoping engine for document mappers. Once an entity type is
//! declared tenant-aware, every query against it is filtered to the active
//! tenant, new instances are stamped with that tenant, and the tenant
//! reference is validated on every write.
//!
//! # Features
//!
//! - **Ambient tenant context**: `with_tenant` installs a tenant for a block and restores the previous one on exit, including on panic
//! - **Query scoping**: A default filter on every tenant-aware type, with optional "global" (null-tenant) instances
//! - **Forced tenancy**: Types that refuse to be queried without a tenant unless tenant-less access is explicitly allowed
//! - **Write stamping and validation**: Presence and immutability of the tenant reference, plus an opt-in ownership check
//! - **Index and uniqueness rewriting**: Tenant-leading indexes and per-tenant uniqueness, applied at registration
//! - **Subtype propagation**: Subtypes inherit their parent's rule unless they override it
//!
//! # Architecture
//!
//! - [`tenant`] - Tenant identity and the ambient context
//! - [`scope`] - Scope rules, the registry, and the query/write/validation hooks
//! - [`types`] - Documents, filters, index specs and uniqueness validators
//! - [`core`] - The host mapper and document store traits
//! - [`backends`] - Reference implementations of the host traits
//! - [`error`] - Error types for all operations
//!
//! # Quick Start
//!
//! ```
//! use helios_tenancy::backends::memory::InMemoryStore;
//! use helios_tenancy::scope::{ScopeOptions, ScopeRegistryBuilder};
//! use helios_tenancy::tenant::{TenantContext, TenantId};
//! use helios_tenancy::types::Filter;
//! use helios_tenancy::ScopeError;
//!
//! let store = InMemoryStore::new();
//!
//! // Registration: declare Invoice as owned by an account.
//! let mut builder = ScopeRegistryBuilder::new(&store);
//! builder
//!     .register_tenant_scope("Invoice", "account", ScopeOptions::new().force_tenant())
//!     .unwrap();
//! let registry = builder.build();
//! let invoices = registry.collection(&store, "Invoice");
//!
//! // Forced-tenant types refuse tenant-less queries.
//! assert!(matches!(invoices.find(Filter::All), Err(ScopeError::TenantNotSet(_))));
//!
//! // Writes inside a tenant block are stamped with that tenant.
//! let created = TenantContext::with_tenant(Some(TenantId::new("acme")), false, || {
//!     invoices.create(invoices.new_document().with_field("number", "001"))
//! })
//! .unwrap();
//! assert_eq!(created.get("account_id"), Some(&serde_json::json!("acme")));
//!
//! // Administrative access across tenants must be asked for explicitly.
//! let all = TenantContext::with_tenant(None, true, || invoices.find(Filter::All)).unwrap();
//! assert_eq!(all.len(), 1);
//! ```
//!
//! # Async
//!
//! The ambient slot is task-local. Use [`TenantContext::scope`] to carry a
//! tenant across `.await` points; spawned tasks start with no tenant.
//!
//! ```
//! use helios_tenancy::tenant::{TenantContext, TenantId};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let seen = TenantContext::for_tenant("acme")
//!     .scope(async {
//!         tokio::task::yield_now().await;
//!         TenantContext::current()
//!     })
//!     .await;
//! assert_eq!(seen, Some(TenantId::new("acme")));
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod backends;
pub mod core;
pub mod error;
pub mod scope;
pub mod tenant;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{
    ConfigurationError, ScopeError, ScopeResult, TenantNotSetError, ValidationError,
    ValidationErrors, ValidationKind,
};
pub use scope::{ScopeOptions, ScopeRegistry, ScopeRegistryBuilder, ScopeRule, ScopedCollection};
pub use tenant::{Tenant, TenantContext, TenantId};
pub use types::{Document, Filter, IndexSpec, TenantOwned, UniquenessValidator};

// Re-export host traits
pub use crate::core::{DocumentStore, Mapper};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
