//! Error types for the store module.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Value serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A stored value has an unexpected shape.
    #[error("invalid data for key {key}: {reason}")]
    InvalidData { key: String, reason: String },

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// The backend refused the operation (quota, lock poisoning, shutdown).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
