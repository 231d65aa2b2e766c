//! Tenant identity and the ambient tenant context.
//!
//! # Core Types
//!
//! - [`TenantId`] - Opaque tenant identity value
//! - [`Tenant`] - Host entities that act as tenants
//! - [`TenantContext`] - The call-chain-local `(tenant, allow_no_tenant)` slot
//!
//! # Examples
//!
//! ```
//! use helios_tenancy::tenant::{TenantContext, TenantId};
//!
//! TenantContext::with_tenant(Some(TenantId::new("acme")), false, || {
//!     assert_eq!(TenantContext::current(), Some(TenantId::new("acme")));
//!
//!     // Administrative block that may run without a tenant
//!     TenantContext::with_tenant(None, true, || {
//!         assert!(TenantContext::allow_no_tenant());
//!     });
//! });
//! ```

mod context;
mod id;

pub use context::TenantContext;
pub use id::{Tenant, TenantId};
