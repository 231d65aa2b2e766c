//! Ambient tenant context.
//!
//! This module defines [`TenantContext`], the `(tenant, allow_no_tenant)` pair
//! that is implicitly available to everything running inside a scoped block.
//! The slot is call-chain local: it lives in a tokio task-local cell, so each
//! task (and each thread running synchronous code) owns its own value and
//! concurrently scheduled work never observes or mutates another chain's slot.
//!
//! Values are only installed for the extent of a scope. Leaving the scope, by
//! normal return, unwinding panic, or dropping the scoped future, restores the
//! immediately enclosing values.

use std::future::Future;

use super::id::TenantId;
use crate::error::ConfigurationError;

tokio::task_local! {
    static ACTIVE: TenantContext;
}

/// The tenant settings in effect for a call chain.
///
/// Outside of any scope the ambient context is the default: no tenant and
/// tenant-less operation not explicitly allowed.
///
/// # Examples
///
/// ```
/// use helios_tenancy::tenant::{TenantContext, TenantId};
///
/// assert_eq!(TenantContext::current(), None);
///
/// let seen = TenantContext::with_tenant(Some(TenantId::new("acme")), false, || {
///     TenantContext::current()
/// });
/// assert_eq!(seen, Some(TenantId::new("acme")));
///
/// // Restored on exit
/// assert_eq!(TenantContext::current(), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TenantContext {
    tenant: Option<TenantId>,
    allow_no_tenant: bool,
}

impl TenantContext {
    /// Creates a context value. It becomes ambient once entered.
    pub fn new(tenant: Option<TenantId>, allow_no_tenant: bool) -> Self {
        Self {
            tenant,
            allow_no_tenant,
        }
    }

    /// A context scoped to a single tenant.
    pub fn for_tenant(tenant: impl Into<TenantId>) -> Self {
        Self::new(Some(tenant.into()), false)
    }

    /// A context with no tenant in which tenant-less access is explicitly permitted.
    pub fn without_tenant() -> Self {
        Self::new(None, true)
    }

    /// Returns the tenant of this context value.
    pub fn tenant(&self) -> Option<&TenantId> {
        self.tenant.as_ref()
    }

    /// Returns whether this context value permits tenant-less operation.
    pub fn allows_no_tenant(&self) -> bool {
        self.allow_no_tenant
    }

    /// Returns a snapshot of the ambient context for the calling chain.
    pub fn ambient() -> TenantContext {
        ACTIVE.try_with(Clone::clone).unwrap_or_default()
    }

    /// Returns the active tenant for the calling chain, or `None`.
    pub fn current() -> Option<TenantId> {
        ACTIVE.try_with(|ctx| ctx.tenant.clone()).ok().flatten()
    }

    /// Returns whether absence of a tenant is currently permitted without error.
    pub fn allow_no_tenant() -> bool {
        ACTIVE
            .try_with(|ctx| ctx.allow_no_tenant)
            .unwrap_or(false)
    }

    /// Runs `body` with `(tenant, allow_no_tenant)` installed as the ambient context.
    ///
    /// The enclosing values are restored unconditionally when `body` returns or
    /// panics. Scopes nest: each exit returns to the values of the scope that
    /// encloses it.
    pub fn with_tenant<T>(
        tenant: Option<TenantId>,
        allow_no_tenant: bool,
        body: impl FnOnce() -> T,
    ) -> T {
        Self::new(tenant, allow_no_tenant).enter(body)
    }

    /// Like [`with_tenant`](Self::with_tenant) for callers whose body is only
    /// known at runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::MissingBody`] without touching the ambient
    /// context when `body` is `None`.
    pub fn try_with_tenant<T, F>(
        tenant: Option<TenantId>,
        allow_no_tenant: bool,
        body: Option<F>,
    ) -> Result<T, ConfigurationError>
    where
        F: FnOnce() -> T,
    {
        let body = body.ok_or(ConfigurationError::MissingBody)?;
        Ok(Self::with_tenant(tenant, allow_no_tenant, body))
    }

    /// Runs `body` with this value installed as the ambient context.
    pub fn enter<T>(self, body: impl FnOnce() -> T) -> T {
        tracing::debug!(
            tenant = ?self.tenant,
            allow_no_tenant = self.allow_no_tenant,
            "Entering tenant scope"
        );
        ACTIVE.sync_scope(self, body)
    }

    /// Wraps `future` so that every poll sees this value as the ambient context.
    ///
    /// Tasks spawned from inside the future start with an empty slot; pass the
    /// context on explicitly with another `scope` if they need it.
    pub fn scope<F>(self, future: F) -> impl Future<Output = F::Output>
    where
        F: Future,
    {
        tracing::debug!(
            tenant = ?self.tenant,
            allow_no_tenant = self.allow_no_tenant,
            "Entering async tenant scope"
        );
        ACTIVE.scope(self, future)
    }
}
