//! Password-based key derivation and authenticated encryption.
//!
//! scrypt derives a symmetric key from the password; XChaCha20-Poly1305
//! encrypts the secret under it.

use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    XChaCha20Poly1305, XNonce,
};
use rand::RngCore;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, Zeroizing};

use crate::error::{KeyError, Result};

const SCRYPT_R: u32 = 8;
const SCRYPT_P: u32 = 1;

/// A random 16-byte scrypt salt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Salt(pub [u8; 16]);

impl Salt {
    /// Generate a new random salt.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

/// A 192-bit nonce for XChaCha20-Poly1305.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncryptionNonce(pub [u8; 24]);

impl EncryptionNonce {
    /// Generate a new random nonce.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 24];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 24] {
        &self.0
    }
}

/// A 256-bit symmetric key derived from a password. Zeroized on drop.
pub struct PasswordKey(Zeroizing<[u8; 32]>);

impl PasswordKey {
    /// Derive a key from a password with scrypt (`N = 2^log_n`, `r = 8`, `p = 1`).
    ///
    /// The password is NFKC-normalised first so that visually identical
    /// passwords typed on different platforms derive the same key.
    pub fn derive(password: &str, salt: &Salt, log_n: u8) -> Result<Self> {
        let normalized = Zeroizing::new(password.nfkc().collect::<String>());
        let params = scrypt::Params::new(log_n, SCRYPT_R, SCRYPT_P, 32)
            .map_err(|e| KeyError::InvalidParams(format!("scrypt params: {e}")))?;

        let mut key = Zeroizing::new([0u8; 32]);
        scrypt::scrypt(normalized.as_bytes(), salt.as_bytes(), &params, &mut key[..])
            .map_err(|e| KeyError::Encryption(format!("scrypt: {e}")))?;
        Ok(Self(key))
    }

    /// Encrypt with this key, binding `aad` into the tag.
    pub fn encrypt(&self, plaintext: &[u8], nonce: &EncryptionNonce, aad: &[u8]) -> Result<Vec<u8>> {
        let cipher = XChaCha20Poly1305::new_from_slice(&self.0[..])
            .map_err(|e| KeyError::Encryption(e.to_string()))?;

        cipher
            .encrypt(
                XNonce::from_slice(nonce.as_bytes()),
                Payload {
                    msg: plaintext,
                    aad,
                },
            )
            .map_err(|e| KeyError::Encryption(e.to_string()))
    }

    /// Decrypt with this key. Any failure is reported as a wrong password.
    pub fn decrypt(
        &self,
        ciphertext: &[u8],
        nonce: &EncryptionNonce,
        aad: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>> {
        let cipher = XChaCha20Poly1305::new_from_slice(&self.0[..])
            .map_err(|_| KeyError::WrongPassword)?;

        let mut plaintext = cipher
            .decrypt(
                XNonce::from_slice(nonce.as_bytes()),
                Payload {
                    msg: ciphertext,
                    aad,
                },
            )
            .map_err(|_| KeyError::WrongPassword)?;

        let out = Zeroizing::new(plaintext.clone());
        plaintext.zeroize();
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_decrypt() {
        let salt = Salt::generate();
        let key = PasswordKey::derive("hunter2", &salt, 4).unwrap();
        let nonce = EncryptionNonce::generate();

        let ciphertext = key.encrypt(b"secret bytes", &nonce, &[0x01]).unwrap();
        assert_ne!(ciphertext.as_slice(), b"secret bytes");

        let plaintext = key.decrypt(&ciphertext, &nonce, &[0x01]).unwrap();
        assert_eq!(plaintext.as_slice(), b"secret bytes");
    }

    #[test]
    fn test_wrong_password_fails() {
        let salt = Salt::generate();
        let nonce = EncryptionNonce::generate();
        let right = PasswordKey::derive("right", &salt, 4).unwrap();
        let wrong = PasswordKey::derive("wrong", &salt, 4).unwrap();

        let ciphertext = right.encrypt(b"secret", &nonce, &[]).unwrap();
        assert_eq!(
            wrong.decrypt(&ciphertext, &nonce, &[]).unwrap_err(),
            KeyError::WrongPassword
        );
    }

    #[test]
    fn test_aad_is_bound() {
        let salt = Salt::generate();
        let nonce = EncryptionNonce::generate();
        let key = PasswordKey::derive("pw", &salt, 4).unwrap();

        let ciphertext = key.encrypt(b"secret", &nonce, &[0x00]).unwrap();
        assert!(key.decrypt(&ciphertext, &nonce, &[0x01]).is_err());
    }

    #[test]
    fn test_nfkc_normalization() {
        let salt = Salt([7u8; 16]);
        // U+212B ANGSTROM SIGN and U+00C5 normalise to the same NFKC form.
        let a = PasswordKey::derive("\u{212B}", &salt, 2).unwrap();
        let b = PasswordKey::derive("\u{00C5}", &salt, 2).unwrap();
        assert_eq!(&a.0[..], &b.0[..]);
    }
}
