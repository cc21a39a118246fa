//! Error types for the settings controller.

use keyward_core::KeyError;
use keyward_perms::PermsError;
use keyward_store::StoreError;
use thiserror::Error;

/// Errors that can occur during settings operations.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Key decoding, encryption, or validation error.
    #[error(transparent)]
    Key(#[from] KeyError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Permission error.
    #[error("permission error: {0}")]
    Permission(#[from] PermsError),

    /// Password and confirmation differ, or the password is empty.
    #[error("passwords do not match")]
    PasswordMismatch,

    /// The current key is in the wrong form for the requested transition.
    #[error("expected a {expected} key, found {found}")]
    WrongVariant {
        expected: &'static str,
        found: &'static str,
    },

    /// No key is configured.
    #[error("no private key configured")]
    NoKey,
}

impl SettingsError {
    /// Whether the error came from a failed storage write or read.
    pub fn is_store(&self) -> bool {
        matches!(
            self,
            Self::Store(_) | Self::Permission(PermsError::Store(_))
        )
    }
}

/// Result type for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;
