//! Traits for the host collaborators.
//!
//! The engine does not implement schema definition, persistence or query
//! execution. It decorates two host surfaces:
//!
//! - [`Mapper`] - Registration-time entry points (reference declaration,
//!   index creation, uniqueness validators)
//! - [`DocumentStore`] - Runtime persistence and query execution
//!
//! [`InMemoryStore`](crate::backends::memory::InMemoryStore) implements both.

pub mod mapper;
pub mod store;

pub use mapper::Mapper;
pub use store::DocumentStore;
