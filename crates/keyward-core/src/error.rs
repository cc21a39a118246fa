//! Error types for Keyward Core.

use thiserror::Error;

/// Errors that can occur while parsing, encoding, or encrypting a key.
///
/// None of these are fatal: callers keep their last good key and report the
/// error to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// The text is not a well-formed hex or `nsec` secret.
    #[error("malformed key: {0}")]
    Decode(String),

    /// The encryption primitive failed.
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Decryption failed. A wrong password and a corrupt blob are
    /// indistinguishable.
    #[error("incorrect password")]
    WrongPassword,

    /// The key failed validation before a save.
    #[error("invalid key: {0}")]
    Validation(String),

    /// Encryption cost parameters are out of range.
    #[error("invalid encryption parameters: {0}")]
    InvalidParams(String),
}

/// Result type for key operations.
pub type Result<T> = std::result::Result<T, KeyError>;
