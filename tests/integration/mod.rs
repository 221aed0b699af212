//! Integration tests for connector operations.
//!
//! Every test builds its own in-memory service, so tests are independent
//! and the journal only ever holds the calls of the operation under test.

pub mod group;
pub mod properties;
pub mod search;
pub mod user;
