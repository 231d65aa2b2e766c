//! In-memory mapper and document store.
//!
//! [`InMemoryStore`] implements both host traits over process memory. It
//! records every declaration the engine forwards (references, indexes,
//! uniqueness validators), which makes the registration-time rewriting
//! observable, and it enforces uniqueness validators and unique indexes on
//! every write.
//!
//! # Example
//!
//! ```
//! use helios_tenancy::backends::memory::InMemoryStore;
//! use helios_tenancy::core::DocumentStore;
//! use helios_tenancy::types::{Document, Filter};
//!
//! let store = InMemoryStore::new();
//! store.insert(Document::new("Account").with_field("name", "Acme")).unwrap();
//!
//! assert_eq!(store.count("Account", &Filter::All), 1);
//! ```

mod backend;
mod storage;

pub use backend::InMemoryStore;
