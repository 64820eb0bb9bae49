//! Test utilities
//!
//! Manual mock implementations and test fixtures for unit testing.
//!
//! The mocks are hand-written: they hold plain in-memory state, count calls,
//! and can be switched into a failing mode per test.
//!
//! The SQLite fixtures build a throwaway copy of the bridge's message log so
//! the real adapter can be exercised end to end.

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
