//! Test utilities
//!
//! Manual mock implementations and fixtures for unit testing the feed
//! without a backend. The mocks record every call so tests can assert on
//! request volume and ordering.

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
