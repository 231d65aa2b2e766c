//! Reference implementations of the host traits.
//!
//! | Backend | Feature | Description |
//! |---------|---------|-------------|
//! | In-memory | `memory` (default) | [`Mapper`](crate::core::Mapper) and [`DocumentStore`](crate::core::DocumentStore) over process memory, for tests and prototypes |
//!
//! # Example
//!
//! ```
//! # #[cfg(feature = "memory")]
//! # fn main() {
//! use helios_tenancy::backends::memory::InMemoryStore;
//! use helios_tenancy::scope::ScopeRegistryBuilder;
//!
//! let store = InMemoryStore::new();
//! let builder = ScopeRegistryBuilder::new(&store);
//! let registry = builder.build();
//! assert!(registry.entity_types().next().is_none());
//! # }
//! # #[cfg(not(feature = "memory"))]
//! # fn main() {}
//! ```

#[cfg(feature = "memory")]
pub mod memory;
