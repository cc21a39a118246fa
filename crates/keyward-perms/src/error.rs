//! Error types for the permissions module.

use keyward_store::StoreError;
use thiserror::Error;

/// Errors that can occur during permission operations.
#[derive(Debug, Error)]
pub enum PermsError {
    /// The stored policy tree could not be read or written.
    #[error("policy storage error: {0}")]
    Store(#[from] StoreError),

    /// A policy value is malformed.
    #[error("invalid policy: {0}")]
    InvalidPolicy(String),
}

/// Result type for permission operations.
pub type Result<T> = std::result::Result<T, PermsError>;
