//! Shared test infrastructure for the tenancy integration tests.

#![allow(dead_code)]

pub mod fixtures;

pub use fixtures::*;
