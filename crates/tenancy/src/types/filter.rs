//! Filter predicates.
//!
//! [`Filter`] is the query-construction surface the engine decorates. It only
//! needs AND/OR composition plus equality, "in set" and "is null" tests. A
//! host executes it directly (see [`Filter::matches`]) or translates it to its
//! own query language (see [`Filter::to_query_document`]).
//!
//! Null semantics follow document stores: a field that is absent and a field
//! that holds `null` both match `null`.

use serde_json::{Map, Value, json};

use super::document::Document;

/// A filter predicate over documents.
///
/// # Examples
///
/// ```
/// use helios_tenancy::types::{Document, Filter};
/// use serde_json::{Value, json};
///
/// let filter = Filter::eq("status", "open")
///     .and(Filter::in_set("account_id", vec![json!("acme"), Value::Null]));
///
/// let doc = Document::new("Invoice").with_field("status", "open");
/// assert!(filter.matches(&doc));
///
/// assert_eq!(
///     filter.to_query_document(),
///     json!({"$and": [
///         {"status": "open"},
///         {"account_id": {"$in": ["acme", null]}}
///     ]})
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Filter {
    /// Matches every document.
    #[default]
    All,

    /// The field equals the value.
    Eq {
        /// Field name.
        field: String,
        /// Expected value.
        value: Value,
    },

    /// The field equals one of the values.
    In {
        /// Field name.
        field: String,
        /// Accepted values.
        values: Vec<Value>,
    },

    /// The field is absent or null.
    IsNull {
        /// Field name.
        field: String,
    },

    /// All sub-filters match.
    And(Vec<Filter>),

    /// At least one sub-filter matches.
    Or(Vec<Filter>),
}

impl Filter {
    /// Creates an equality filter.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Creates an "in set" filter.
    pub fn in_set(field: impl Into<String>, values: Vec<Value>) -> Self {
        Filter::In {
            field: field.into(),
            values,
        }
    }

    /// Creates an "is null" filter.
    pub fn is_null(field: impl Into<String>) -> Self {
        Filter::IsNull {
            field: field.into(),
        }
    }

    /// Returns `true` if this filter matches everything.
    pub fn is_all(&self) -> bool {
        matches!(self, Filter::All)
    }

    /// Combines two filters with AND.
    ///
    /// [`Filter::All`] is the identity and nested ANDs are flattened, so
    /// neither side is ever replaced by the other.
    pub fn and(self, other: Filter) -> Filter {
        match (self, other) {
            (Filter::All, f) | (f, Filter::All) => f,
            (Filter::And(mut left), Filter::And(right)) => {
                left.extend(right);
                Filter::And(left)
            }
            (Filter::And(mut left), f) => {
                left.push(f);
                Filter::And(left)
            }
            (f, Filter::And(right)) => {
                let mut all = Vec::with_capacity(right.len() + 1);
                all.push(f);
                all.extend(right);
                Filter::And(all)
            }
            (left, right) => Filter::And(vec![left, right]),
        }
    }

    /// Combines two filters with OR.
    pub fn or(self, other: Filter) -> Filter {
        match (self, other) {
            (Filter::All, _) | (_, Filter::All) => Filter::All,
            (Filter::Or(mut left), f) => {
                left.push(f);
                Filter::Or(left)
            }
            (left, right) => Filter::Or(vec![left, right]),
        }
    }

    /// Evaluates the filter against a document.
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Filter::All => true,
            Filter::Eq { field, value } => value_matches(doc.get(field), value),
            Filter::In { field, values } => {
                let actual = doc.get(field);
                values.iter().any(|v| value_matches(actual, v))
            }
            Filter::IsNull { field } => is_null(doc.get(field)),
            Filter::And(filters) => filters.iter().all(|f| f.matches(doc)),
            Filter::Or(filters) => filters.iter().any(|f| f.matches(doc)),
        }
    }

    /// Renders the filter as a Mongo-style query document.
    pub fn to_query_document(&self) -> Value {
        match self {
            Filter::All => json!({}),
            Filter::Eq { field, value } => single(field, value.clone()),
            Filter::In { field, values } => single(field, json!({ "$in": values })),
            Filter::IsNull { field } => single(field, Value::Null),
            Filter::And(filters) => json!({
                "$and": filters.iter().map(Filter::to_query_document).collect::<Vec<_>>()
            }),
            Filter::Or(filters) => json!({
                "$or": filters.iter().map(Filter::to_query_document).collect::<Vec<_>>()
            }),
        }
    }
}

fn single(field: &str, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(field.to_string(), value);
    Value::Object(map)
}

fn is_null(actual: Option<&Value>) -> bool {
    actual.is_none_or(Value::is_null)
}

fn value_matches(actual: Option<&Value>, expected: &Value) -> bool {
    if expected.is_null() {
        return is_null(actual);
    }
    actual == Some(expected)
}
