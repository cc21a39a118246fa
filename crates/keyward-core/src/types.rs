//! Encryption cost parameters.

use serde::{Deserialize, Serialize};

use crate::error::{KeyError, Result};

/// Smallest accepted scrypt cost exponent.
pub const MIN_LOG_N: u8 = 1;

/// Largest cost exponent offered when encrypting.
pub const MAX_LOG_N: u8 = 16;

/// How the secret was handled before it was encrypted (NIP-49 key security byte).
///
/// The byte is bound into the ciphertext as associated data, so it cannot be
/// altered without breaking decryption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum KeySecurity {
    /// The key is known to have been handled insecurely.
    #[default]
    Insecure = 0x00,
    /// The key is known not to have been handled insecurely.
    Secure = 0x01,
    /// The client does not track this.
    Unknown = 0x02,
}

impl KeySecurity {
    /// All selectable values, in byte order.
    pub const ALL: [KeySecurity; 3] = [Self::Insecure, Self::Secure, Self::Unknown];

    /// Convert from the wire byte.
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Self::Insecure),
            0x01 => Some(Self::Secure),
            0x02 => Some(Self::Unknown),
            _ => None,
        }
    }

    /// The wire byte.
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Tunable cost parameters for password encryption.
///
/// Both fields are validated on construction; an `EncryptionParams` value is
/// always within the supported ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptionParams {
    log_n: u8,
    security: KeySecurity,
}

impl EncryptionParams {
    /// Create parameters, rejecting a cost exponent outside `1..=16`.
    pub fn new(log_n: u8, security: KeySecurity) -> Result<Self> {
        if !(MIN_LOG_N..=MAX_LOG_N).contains(&log_n) {
            return Err(KeyError::InvalidParams(format!(
                "cost exponent {log_n} outside {MIN_LOG_N}..={MAX_LOG_N}"
            )));
        }
        Ok(Self { log_n, security })
    }

    /// Create parameters from a raw security byte.
    pub fn from_raw(log_n: u8, security_byte: u8) -> Result<Self> {
        let security = KeySecurity::from_u8(security_byte).ok_or_else(|| {
            KeyError::InvalidParams(format!("security byte {security_byte:#04x} outside 0x00..=0x02"))
        })?;
        Self::new(log_n, security)
    }

    /// The scrypt cost exponent (`N = 2^log_n`).
    pub const fn log_n(&self) -> u8 {
        self.log_n
    }

    /// The key security byte.
    pub const fn security(&self) -> KeySecurity {
        self.security
    }

    /// Replace the cost exponent.
    pub fn with_log_n(self, log_n: u8) -> Result<Self> {
        Self::new(log_n, self.security)
    }

    /// Replace the security byte.
    pub fn with_security(self, security: KeySecurity) -> Self {
        Self { security, ..self }
    }
}

impl Default for EncryptionParams {
    fn default() -> Self {
        Self {
            log_n: MIN_LOG_N,
            security: KeySecurity::Insecure,
        }
    }
}
