//! Core types exchanged with the host mapper.
//!
//! - [`Document`] / [`TenantOwned`] - Entity instances and their tenant reference
//! - [`Filter`] - Query predicates with AND composition, "in set" and "is null"
//! - [`IndexSpec`] - Ordered index keys plus build options
//! - [`UniquenessValidator`] - Uniqueness rules with a scope field list

mod document;
mod filter;
mod index;
mod uniqueness;

pub use document::{Document, TenantOwned};
pub use filter::Filter;
pub use index::{IndexDirection, IndexKey, IndexOptions, IndexSpec};
pub use uniqueness::UniquenessValidator;
