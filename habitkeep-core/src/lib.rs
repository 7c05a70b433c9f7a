//! # habitkeep-core
//!
//! Core library for habitkeep - a personal habit tracker.
//!
//! This library provides:
//! - Domain types for trackers, categories, and completion records
//! - Database storage layer with SQLite
//! - Change notification bus for live observers
//! - Derived views: the per-day scheduled tracker list and global statistics
//! - Configuration management and logging infrastructure
//!
//! ## Architecture
//!
//! The store exclusively owns the durable entities; callers receive value
//! snapshots and write through the operations on [`Database`]. Every
//! committed mutation notifies registered observers per affected entity type
//! with a fresh, full snapshot; callers then recompute the derived views in
//! [`views`] from the snapshots they pull.
//!
//! ## Example
//!
//! ```rust,no_run
//! use habitkeep_core::{Config, Database};
//!
//! // Load configuration
//! let config = Config::load().expect("failed to load config");
//!
//! // Open database
//! let db = Database::open(&config.database_path()).expect("failed to open database");
//! db.migrate().expect("failed to run migrations");
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use db::{Database, ToggleOutcome};
pub use error::{Error, Result};
pub use observer::{Observer, SubscriptionId};
pub use types::*;
pub use views::{day_view, CategoryDayView, CompletionFilter, DayQuery, Statistics, TrackerDayView};

// Public modules
pub mod config;
pub mod db;
pub mod error;
pub mod format;
pub mod logging;
pub mod observer;
pub mod types;
pub mod views;
