//! Error types for habitkeep-core

use thiserror::Error;
use uuid::Uuid;

/// Main error type for the habitkeep-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Tracker not found
    #[error("tracker not found: {0}")]
    TrackerNotFound(Uuid),

    /// Category not found
    #[error("category not found: {0}")]
    CategoryNotFound(String),

    /// Category title collision on create or rename
    #[error("category already exists: {0}")]
    DuplicateCategory(String),

    /// Empty or otherwise unusable title
    #[error("invalid title: {0}")]
    InvalidTitle(String),
}

/// Result type alias for habitkeep-core
pub type Result<T> = std::result::Result<T, Error>;
