//! Error types for the tenant-scoping engine.
//!
//! Failures are local and synchronous. Query-time tenant enforcement raises
//! [`TenantNotSetError`], misuse of the configuration surface raises
//! [`ConfigurationError`], and a failed validation pass is reported as a
//! [`ValidationErrors`] value the caller can present to a user.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use std::fmt;

use thiserror::Error;

/// The primary error type for scoped operations.
#[derive(Error, Debug)]
pub enum ScopeError {
    /// A forced-tenant query ran without a tenant
    #[error(transparent)]
    TenantNotSet(#[from] TenantNotSetError),

    /// The instance failed validation
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// Invalid use of the configuration surface
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The host mapper rejected a declaration
    #[error(transparent)]
    Mapper(#[from] MapperError),

    /// The document store rejected an operation
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for scoped operations.
pub type ScopeResult<T> = Result<T, ScopeError>;

/// A query against a forced-tenant entity type ran with no active tenant
/// while tenant-less access was not allowed.
///
/// Not retried: the caller must supply a tenant or explicitly allow
/// tenant-less access.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("no tenant set for query on {entity_type}")]
pub struct TenantNotSetError {
    pub entity_type: String,
}

/// Errors raised by the configuration surface.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A scoped block was requested without a body.
    #[error("a body is required to run a tenant scope")]
    MissingBody,

    /// The entity type already carries an explicitly registered scope rule.
    #[error("entity type {entity_type} already has a tenant scope")]
    AlreadyScoped { entity_type: String },

    /// The association name cannot be turned into a field name.
    #[error("invalid tenant association name: {association:?}")]
    InvalidAssociation { association: String },

    /// The subtype was already introduced.
    #[error("subtype {entity_type} is already registered")]
    DuplicateSubtype { entity_type: String },

    /// A type was declared as its own subtype.
    #[error("entity type {entity_type} cannot inherit from itself")]
    SelfInheritance { entity_type: String },
}

/// The kind of tenant validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationKind {
    /// A required tenant reference is unset.
    Presence,
    /// An already-set tenant reference was changed.
    Immutable,
    /// The tenant reference does not belong to the active tenant.
    Ownership,
}

impl fmt::Display for ValidationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationKind::Presence => write!(f, "presence"),
            ValidationKind::Immutable => write!(f, "immutable"),
            ValidationKind::Ownership => write!(f, "ownership"),
        }
    }
}

/// A single validation failure on a field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field} {message}")]
pub struct ValidationError {
    pub field: String,
    pub kind: ValidationKind,
    pub message: String,
}

impl ValidationError {
    /// Creates a presence failure for `field`.
    pub fn presence(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind: ValidationKind::Presence,
            message: "is mandatory".to_string(),
        }
    }

    /// Creates an immutability failure for `field`.
    pub fn immutable(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind: ValidationKind::Immutable,
            message: "is immutable and cannot be updated".to_string(),
        }
    }

    /// Creates an ownership failure for `field`.
    pub fn ownership(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind: ValidationKind::Ownership,
            message: "is not authorized for the current tenant".to_string(),
        }
    }
}

/// All failures produced by one validation pass over an instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    pub entity_type: String,
    pub errors: Vec<ValidationError>,
}

impl ValidationErrors {
    /// Returns `true` if any failure has the given kind.
    pub fn has(&self, kind: ValidationKind) -> bool {
        self.errors.iter().any(|e| e.kind == kind)
    }

    /// Returns the failures recorded against `field`.
    pub fn on(&self, field: &str) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter().filter(move |e| e.field == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed for {}: ", self.entity_type)?;
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Errors reported by the host mapper during registration.
#[derive(Error, Debug)]
pub enum MapperError {
    /// The mapper refused the declaration.
    #[error("mapper rejected {operation} on {entity_type}: {message}")]
    Rejected {
        operation: String,
        entity_type: String,
        message: String,
    },
}

/// Errors reported by a document store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A uniqueness validator matched an existing document.
    #[error("duplicate key on {entity_type} for ({})", .fields.join(", "))]
    DuplicateKey {
        entity_type: String,
        fields: Vec<String>,
    },

    /// The document to replace does not exist.
    #[error("document not found: {entity_type}/{id}")]
    NotFound { entity_type: String, id: String },

    /// A document that was never written by a store was passed to an update.
    #[error("document has not been persisted: {entity_type}/{id}")]
    NotPersisted { entity_type: String, id: String },
}
