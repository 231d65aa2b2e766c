//! Uniqueness validator declarations.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::document::Document;

/// A uniqueness rule over one or more fields, evaluated within a scope.
///
/// Two documents conflict when every field in `fields` and every field in
/// `scope` holds equal values. With an empty scope the rule is global.
///
/// # Examples
///
/// ```
/// use helios_tenancy::types::{Document, UniquenessValidator};
///
/// let rule = UniquenessValidator::new("number").scoped_to("account_id");
///
/// let a = Document::new("Invoice").with_field("number", "001").with_field("account_id", "a");
/// let b = Document::new("Invoice").with_field("number", "001").with_field("account_id", "b");
/// assert!(!rule.conflicts(&a, &b));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniquenessValidator {
    /// Fields whose combined value must be unique.
    pub fields: Vec<String>,
    /// Fields that partition the uniqueness check.
    #[serde(default)]
    pub scope: Vec<String>,
    /// Compare string values case-sensitively.
    #[serde(default = "default_true")]
    pub case_sensitive: bool,
    /// Skip the check when any unique field is null or absent.
    #[serde(default)]
    pub allow_null: bool,
}

fn default_true() -> bool {
    true
}

impl UniquenessValidator {
    /// Creates a global uniqueness rule on `field`.
    pub fn new(field: impl Into<String>) -> Self {
        Self::for_fields(vec![field.into()])
    }

    /// Creates a global uniqueness rule on several fields.
    pub fn for_fields(fields: Vec<String>) -> Self {
        Self {
            fields,
            scope: Vec::new(),
            case_sensitive: true,
            allow_null: false,
        }
    }

    /// Adds a scope field.
    pub fn scoped_to(mut self, field: impl Into<String>) -> Self {
        self.scope.push(field.into());
        self
    }

    /// Compares string values case-insensitively.
    pub fn case_insensitive(mut self) -> Self {
        self.case_sensitive = false;
        self
    }

    /// Skips documents with null unique fields.
    pub fn allowing_null(mut self) -> Self {
        self.allow_null = true;
        self
    }

    /// Returns `true` if `candidate` and `existing` violate this rule.
    ///
    /// A document never conflicts with itself.
    pub fn conflicts(&self, candidate: &Document, existing: &Document) -> bool {
        if candidate.id() == existing.id() {
            return false;
        }
        if self.allow_null
            && self
                .fields
                .iter()
                .any(|f| candidate.get(f).is_none_or(Value::is_null))
        {
            return false;
        }
        let unique_equal = self
            .fields
            .iter()
            .all(|f| self.values_equal(candidate.get(f), existing.get(f)));
        let scope_equal = self
            .scope
            .iter()
            .all(|f| same_value(candidate.get(f), existing.get(f)));
        unique_equal && scope_equal
    }

    fn values_equal(&self, a: Option<&Value>, b: Option<&Value>) -> bool {
        match (a, b) {
            (Some(Value::String(a)), Some(Value::String(b))) if !self.case_sensitive => {
                a.to_lowercase() == b.to_lowercase()
            }
            _ => same_value(a, b),
        }
    }
}

/// Absent and null compare equal.
fn same_value(a: Option<&Value>, b: Option<&Value>) -> bool {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    a == b
}
