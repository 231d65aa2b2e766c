//! Tenant identity.
//!
//! The engine treats tenants opaquely: whatever entity the host designates as
//! a tenant (an account, an organization) is reduced to its identity value,
//! a [`TenantId`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An opaque tenant identifier.
///
/// Only the identity value matters to the engine. It is stored in tenant
/// reference fields as a JSON string.
///
/// # Examples
///
/// ```
/// use helios_tenancy::tenant::TenantId;
///
/// let tenant = TenantId::new("acme");
/// assert_eq!(tenant.as_str(), "acme");
/// assert_eq!(tenant.to_value(), serde_json::json!("acme"));
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    /// Creates a tenant ID from the given identity value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the tenant ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the value stored in a tenant reference field.
    pub fn to_value(&self) -> Value {
        Value::String(self.0.clone())
    }

    /// Reads a tenant ID back from a stored reference value.
    ///
    /// `null` and non-string values resolve to `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TenantId({})", self.0)
    }
}

impl FromStr for TenantId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(TenantId::new(s))
    }
}

impl From<&str> for TenantId {
    fn from(s: &str) -> Self {
        TenantId::new(s)
    }
}

impl From<String> for TenantId {
    fn from(s: String) -> Self {
        TenantId::new(s)
    }
}

impl AsRef<str> for TenantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// An entity the host designates as a tenant.
///
/// Implement this for the host's account/organization type so it can be
/// handed to [`TenantContext::with_tenant`](super::TenantContext::with_tenant)
/// via [`Tenant::tenant_id`].
pub trait Tenant {
    /// Returns the identity value of this tenant.
    fn tenant_id(&self) -> TenantId;
}

impl Tenant for TenantId {
    fn tenant_id(&self) -> TenantId {
        self.clone()
    }
}

impl<T: Tenant + ?Sized> Tenant for &T {
    fn tenant_id(&self) -> TenantId {
        (**self).tenant_id()
    }
}
