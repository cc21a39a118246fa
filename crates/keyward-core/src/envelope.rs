//! NIP-49 encrypted key envelope (`ncryptsec`).
//!
//! Decoded layout, 91 bytes:
//!
//! | offset | len | field |
//! |---|---|---|
//! | 0 | 1 | version (`0x02`) |
//! | 1 | 1 | `log_n` |
//! | 2 | 16 | salt |
//! | 18 | 24 | nonce |
//! | 42 | 1 | key security byte (also the AEAD associated data) |
//! | 43 | 48 | ciphertext + tag |

use bech32::{Bech32, Hrp};
use zeroize::Zeroize;

use crate::codec;
use crate::crypto::{EncryptionNonce, PasswordKey, Salt};
use crate::error::{KeyError, Result};
use crate::key::SecretKey;
use crate::types::{EncryptionParams, KeySecurity};

/// Envelope format version.
pub const ENVELOPE_VERSION: u8 = 0x02;

/// Refuse to run scrypt above this exponent when decrypting untrusted blobs.
pub const MAX_DECRYPT_LOG_N: u8 = 22;

const NCRYPTSEC_HRP: Hrp = Hrp::parse_unchecked("ncryptsec");
const ENVELOPE_LEN: usize = 91;
const CIPHERTEXT_LEN: usize = 48;

/// A parsed `ncryptsec` envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedKeyEnvelope {
    /// Scrypt cost exponent.
    pub log_n: u8,
    /// Scrypt salt.
    pub salt: Salt,
    /// AEAD nonce.
    pub nonce: EncryptionNonce,
    /// Key security byte.
    pub security: KeySecurity,
    /// Encrypted secret with authentication tag.
    pub ciphertext: Vec<u8>,
}

impl EncryptedKeyEnvelope {
    /// Encrypt a secret under a password.
    pub fn seal(secret: &SecretKey, password: &str, params: EncryptionParams) -> Result<Self> {
        if password.is_empty() {
            return Err(KeyError::Encryption("password must not be empty".into()));
        }

        let salt = Salt::generate();
        let nonce = EncryptionNonce::generate();
        let security = params.security();
        let key = PasswordKey::derive(password, &salt, params.log_n())?;
        let ciphertext = key.encrypt(secret.as_bytes(), &nonce, &[security.as_u8()])?;

        Ok(Self {
            log_n: params.log_n(),
            salt,
            nonce,
            security,
            ciphertext,
        })
    }

    /// Decrypt the secret. Every failure is reported as a wrong password.
    pub fn open(&self, password: &str) -> Result<SecretKey> {
        if self.log_n > MAX_DECRYPT_LOG_N {
            return Err(KeyError::WrongPassword);
        }
        let key =
            PasswordKey::derive(password, &self.salt, self.log_n).map_err(|_| KeyError::WrongPassword)?;
        let plaintext = key.decrypt(&self.ciphertext, &self.nonce, &[self.security.as_u8()])?;
        SecretKey::from_slice(&plaintext).map_err(|_| KeyError::WrongPassword)
    }

    /// Serialize to the fixed binary layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(ENVELOPE_LEN);
        buf.push(ENVELOPE_VERSION);
        buf.push(self.log_n);
        buf.extend_from_slice(self.salt.as_bytes());
        buf.extend_from_slice(self.nonce.as_bytes());
        buf.push(self.security.as_u8());
        buf.extend_from_slice(&self.ciphertext);
        buf
    }

    /// Parse the fixed binary layout.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != ENVELOPE_LEN {
            return Err(KeyError::Decode(format!(
                "envelope length {} (expected {ENVELOPE_LEN})",
                bytes.len()
            )));
        }
        if bytes[0] != ENVELOPE_VERSION {
            return Err(KeyError::Decode(format!(
                "unsupported envelope version {:#04x}",
                bytes[0]
            )));
        }

        let mut salt = [0u8; 16];
        salt.copy_from_slice(&bytes[2..18]);
        let mut nonce = [0u8; 24];
        nonce.copy_from_slice(&bytes[18..42]);
        let security = KeySecurity::from_u8(bytes[42]).ok_or_else(|| {
            KeyError::Decode(format!("unknown key security byte {:#04x}", bytes[42]))
        })?;

        Ok(Self {
            log_n: bytes[1],
            salt: Salt(salt),
            nonce: EncryptionNonce(nonce),
            security,
            ciphertext: bytes[43..43 + CIPHERTEXT_LEN].to_vec(),
        })
    }

    /// Encode as an `ncryptsec1...` string.
    pub fn to_ncryptsec(&self) -> Result<String> {
        bech32::encode::<Bech32>(NCRYPTSEC_HRP, &self.to_bytes())
            .map_err(|e| KeyError::Encryption(format!("bech32: {e}")))
    }

    /// Decode an `ncryptsec1...` string.
    pub fn from_ncryptsec(text: &str) -> Result<Self> {
        let (hrp, mut data) = codec::decode_bech32(text)?;
        if hrp != NCRYPTSEC_HRP {
            data.zeroize();
            return Err(KeyError::Decode(format!("expected ncryptsec, got {hrp}")));
        }
        let envelope = Self::from_bytes(&data);
        data.zeroize();
        envelope
    }
}

/// Encrypt a secret to an `ncryptsec1...` string.
pub fn encrypt_secret(secret: &SecretKey, password: &str, params: EncryptionParams) -> Result<String> {
    EncryptedKeyEnvelope::seal(secret, password, params)?.to_ncryptsec()
}

/// Decrypt an `ncryptsec1...` string.
///
/// A malformed blob and a wrong password both yield [`KeyError::WrongPassword`].
pub fn decrypt_secret(ncryptsec: &str, password: &str) -> Result<SecretKey> {
    EncryptedKeyEnvelope::from_ncryptsec(ncryptsec)
        .map_err(|_| KeyError::WrongPassword)?
        .open(password)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seal_open_roundtrip() {
        let secret = SecretKey::from_bytes([0x42; 32]);
        let params = EncryptionParams::new(4, KeySecurity::Secure).unwrap();

        let blob = encrypt_secret(&secret, "password", params).unwrap();
        assert!(blob.starts_with("ncryptsec1"));

        let recovered = decrypt_secret(&blob, "password").unwrap();
        assert_eq!(recovered, secret);
    }

    #[test]
    fn test_envelope_layout() {
        let secret = SecretKey::from_bytes([0x11; 32]);
        let params = EncryptionParams::new(3, KeySecurity::Unknown).unwrap();
        let envelope = EncryptedKeyEnvelope::seal(&secret, "pw", params).unwrap();

        let bytes = envelope.to_bytes();
        assert_eq!(bytes.len(), 91);
        assert_eq!(bytes[0], ENVELOPE_VERSION);
        assert_eq!(bytes[1], 3);
        assert_eq!(bytes[42], 0x02);
        assert_eq!(EncryptedKeyEnvelope::from_bytes(&bytes).unwrap(), envelope);
    }

    #[test]
    fn test_empty_password_rejected() {
        let secret = SecretKey::from_bytes([0x42; 32]);
        assert!(matches!(
            encrypt_secret(&secret, "", EncryptionParams::default()),
            Err(KeyError::Encryption(_))
        ));
    }

    #[test]
    fn test_wrong_password() {
        let secret = SecretKey::from_bytes([0x42; 32]);
        let blob = encrypt_secret(&secret, "right", EncryptionParams::default()).unwrap();
        assert_eq!(decrypt_secret(&blob, "wrong").unwrap_err(), KeyError::WrongPassword);
    }

    #[test]
    fn test_malformed_blob_is_wrong_password() {
        assert_eq!(
            decrypt_secret("ncryptsec1garbage", "pw").unwrap_err(),
            KeyError::WrongPassword
        );
        let nsec = "nsec1vl029mgpspedva04g90vltkh6fvh240zqtv9k0t9af8935ke9laqsnlfe5";
        assert_eq!(decrypt_secret(nsec, "pw").unwrap_err(), KeyError::WrongPassword);
    }

    #[test]
    fn test_bech32m_blob_rejected() {
        let secret = SecretKey::from_bytes([0x42; 32]);
        let params = EncryptionParams::new(4, KeySecurity::Secure).unwrap();
        let envelope = EncryptedKeyEnvelope::seal(&secret, "pw", params).unwrap();
        let blob = bech32::encode::<bech32::Bech32m>(NCRYPTSEC_HRP, &envelope.to_bytes()).unwrap();
        assert!(matches!(
            EncryptedKeyEnvelope::from_ncryptsec(&blob),
            Err(KeyError::Decode(_))
        ));
        assert_eq!(decrypt_secret(&blob, "pw").unwrap_err(), KeyError::WrongPassword);
    }

    #[test]
    fn test_excessive_log_n_refused() {
        let secret = SecretKey::from_bytes([0x42; 32]);
        let mut envelope =
            EncryptedKeyEnvelope::seal(&secret, "pw", EncryptionParams::default()).unwrap();
        envelope.log_n = MAX_DECRYPT_LOG_N + 1;
        assert_eq!(envelope.open("pw").unwrap_err(), KeyError::WrongPassword);
    }

    #[test]
    fn test_nip49_vector() {
        let ncryptsec = "ncryptsec1qgg9947rlpvqu76pj5ecreduf9jxhselq2nae2kghhvd5g7dgjtcxfqtd67p9m0w57lspw8gsq6yphnm8623nsl8xn9j4jdzz84zm3frztj3z7s35vpzmqf6ksu8r89qk5z2zxfmu5gv8th8wclt0h4p";
        let secret = decrypt_secret(ncryptsec, "nostr").unwrap();
        assert_eq!(
            secret.to_hex(),
            "3501454135014541350145413501453fefb02227e449e57cf4d3a3ce05378683"
        );
    }
}
