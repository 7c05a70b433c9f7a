//! Database storage layer
//!
//! SQLite-backed persistent store for trackers, categories and completion
//! records.

pub mod repo;
pub mod schema;

pub use repo::{Database, ToggleOutcome};
