//! Index specifications.
//!
//! An [`IndexSpec`] is an ordered list of keyed fields plus build options, as
//! accepted by the host's index-creation API.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Sort direction of an index key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IndexDirection {
    /// Ascending (`1`).
    #[default]
    Ascending,
    /// Descending (`-1`).
    Descending,
}

impl IndexDirection {
    /// Returns the conventional numeric form (`1` / `-1`).
    pub fn as_i32(self) -> i32 {
        match self {
            IndexDirection::Ascending => 1,
            IndexDirection::Descending => -1,
        }
    }
}

/// A single indexed field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexKey {
    /// Field name.
    pub field: String,
    /// Sort direction.
    #[serde(default)]
    pub direction: IndexDirection,
}

/// Index build options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexOptions {
    /// Build the index without blocking other operations.
    pub background: bool,
    /// Enforce uniqueness over the keyed fields.
    pub unique: bool,
    /// Skip documents that lack the indexed fields.
    pub sparse: bool,
    /// Explicit index name.
    pub name: Option<String>,
}

/// An index definition: ordered keys plus options.
///
/// # Examples
///
/// ```
/// use helios_tenancy::types::IndexSpec;
///
/// let index = IndexSpec::ascending("number")
///     .then_descending("issued_at")
///     .unique();
///
/// assert_eq!(index.fields().collect::<Vec<_>>(), vec!["number", "issued_at"]);
/// assert!(index.options.unique);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSpec {
    /// The keyed fields, in order.
    pub keys: Vec<IndexKey>,
    /// Build options.
    #[serde(default)]
    pub options: IndexOptions,
}

impl IndexSpec {
    /// Creates a spec from an ordered key list.
    pub fn new(keys: Vec<IndexKey>) -> Self {
        Self {
            keys,
            options: IndexOptions::default(),
        }
    }

    /// Creates a single-field ascending index.
    pub fn ascending(field: impl Into<String>) -> Self {
        Self::default().then(field, IndexDirection::Ascending)
    }

    /// Creates a single-field descending index.
    pub fn descending(field: impl Into<String>) -> Self {
        Self::default().then(field, IndexDirection::Descending)
    }

    /// Appends a key.
    pub fn then(mut self, field: impl Into<String>, direction: IndexDirection) -> Self {
        self.keys.push(IndexKey {
            field: field.into(),
            direction,
        });
        self
    }

    /// Appends an ascending key.
    pub fn then_ascending(self, field: impl Into<String>) -> Self {
        self.then(field, IndexDirection::Ascending)
    }

    /// Appends a descending key.
    pub fn then_descending(self, field: impl Into<String>) -> Self {
        self.then(field, IndexDirection::Descending)
    }

    /// Replaces the options.
    pub fn with_options(mut self, options: IndexOptions) -> Self {
        self.options = options;
        self
    }

    /// Requests a background build.
    pub fn background(mut self) -> Self {
        self.options.background = true;
        self
    }

    /// Requests a unique index.
    pub fn unique(mut self) -> Self {
        self.options.unique = true;
        self
    }

    /// Returns the keyed field names in order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(|k| k.field.as_str())
    }

    /// Returns the first keyed field.
    pub fn leading_field(&self) -> Option<&str> {
        self.keys.first().map(|k| k.field.as_str())
    }

    /// Returns the position of `field` among the keys.
    pub fn position(&self, field: &str) -> Option<usize> {
        self.keys.iter().position(|k| k.field == field)
    }

    /// Renders the keys as an ordered `{field: 1 | -1}` document.
    pub fn key_document(&self) -> Value {
        let mut map = Map::new();
        for key in &self.keys {
            map.insert(key.field.clone(), Value::from(key.direction.as_i32()));
        }
        Value::Object(map)
    }
}

impl fmt::Display for IndexSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<String> = self
            .keys
            .iter()
            .map(|k| format!("{}:{}", k.field, k.direction.as_i32()))
            .collect();
        write!(f, "({})", keys.join(", "))
    }
}
