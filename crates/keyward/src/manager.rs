//! The current private key and its password transitions.
//!
//! Encrypting and decrypting write straight to storage; plain edits wait for
//! an explicit save. In both cases the new form is computed and persisted
//! before it replaces the in-memory key, so a failure at any step leaves the
//! previous key in place.

use std::sync::Arc;

use keyward_core::{
    codec, decrypt_secret, encrypt_secret, EncryptionParams, KeyError, KeyInput, KeySecurity,
    SigningKey,
};
use keyward_store::{StorageKey, Store};
use serde_json::Value;
use zeroize::Zeroizing;

use crate::error::{Result, SettingsError};

/// Owns the key field, the password buffers, and the encryption parameters.
pub struct KeyEncryptionManager<S: Store> {
    store: Arc<S>,
    input: KeyInput,
    password: Zeroizing<String>,
    confirm_password: Zeroizing<String>,
    decrypt_password: Zeroizing<String>,
    passwords_match: bool,
    params: EncryptionParams,
}

impl<S: Store> KeyEncryptionManager<S> {
    /// Create a manager with no key configured.
    pub fn new(store: Arc<S>, params: EncryptionParams) -> Self {
        Self {
            store,
            input: KeyInput::Empty,
            password: Zeroizing::default(),
            confirm_password: Zeroizing::default(),
            decrypt_password: Zeroizing::default(),
            passwords_match: true,
            params,
        }
    }

    /// Install the value read from storage.
    ///
    /// Plain keys come back as hex and are shown in their `nsec` form. A
    /// malformed value is kept as an invalid draft so it can be corrected.
    pub fn hydrate(&mut self, stored: Option<&str>) {
        self.input = KeyInput::from_stored(stored.unwrap_or_default());
        match &self.input {
            KeyInput::Invalid(_) => tracing::warn!("stored private key is malformed"),
            KeyInput::Key(key) => tracing::debug!(variant = key.variant_name(), "loaded private key"),
            KeyInput::Empty => tracing::debug!("no private key stored"),
        }
    }

    /// The key field.
    pub fn input(&self) -> &KeyInput {
        &self.input
    }

    /// The configured key, if the field holds a valid one.
    pub fn key(&self) -> Option<&SigningKey> {
        self.input.key()
    }

    /// Replace the key field with user-typed text.
    pub fn set_input(&mut self, text: &str) -> &KeyInput {
        self.input = KeyInput::from_text(text);
        &self.input
    }

    /// Replace the key field with a freshly generated key.
    pub fn generate(&mut self) -> &KeyInput {
        self.input = KeyInput::Key(SigningKey::encoded(&codec::generate()));
        tracing::info!("generated new private key");
        &self.input
    }

    /// The hex public key for the current plain key.
    pub fn public_key(&self) -> Option<String> {
        let secret = self.key()?.secret().ok()?;
        codec::public_key_hex(&secret).ok()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Password buffers
    // ─────────────────────────────────────────────────────────────────────────

    /// Edit the password buffer.
    pub fn set_password(&mut self, password: &str) {
        self.password = Zeroizing::new(password.to_string());
        self.passwords_match = *self.password == *self.confirm_password;
    }

    /// Edit the confirmation buffer.
    pub fn set_confirm_password(&mut self, password: &str) {
        self.confirm_password = Zeroizing::new(password.to_string());
        self.passwords_match = *self.password == *self.confirm_password;
    }

    /// Edit the password used by the decrypt form.
    pub fn set_decrypt_password(&mut self, password: &str) {
        self.decrypt_password = Zeroizing::new(password.to_string());
    }

    /// Whether the password and its confirmation are equal.
    pub fn passwords_match(&self) -> bool {
        self.passwords_match
    }

    /// Whether [`encrypt`](Self::encrypt) would be attempted.
    pub fn can_encrypt(&self) -> bool {
        self.passwords_match
            && !self.password.is_empty()
            && !self.confirm_password.is_empty()
            && self.key().is_some_and(SigningKey::is_plain)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Encryption parameters
    // ─────────────────────────────────────────────────────────────────────────

    /// The parameters the next encryption will use.
    pub fn params(&self) -> EncryptionParams {
        self.params
    }

    /// Set the scrypt cost exponent.
    pub fn set_log_n(&mut self, log_n: u8) -> Result<()> {
        self.params = self.params.with_log_n(log_n)?;
        Ok(())
    }

    /// Set the key security byte.
    pub fn set_security(&mut self, security: KeySecurity) {
        self.params = self.params.with_security(security);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transitions
    // ─────────────────────────────────────────────────────────────────────────

    /// Encrypt the current key with the password buffers and parameters.
    pub async fn encrypt(&mut self) -> Result<()> {
        if !self.passwords_match || self.password.is_empty() {
            return Err(SettingsError::PasswordMismatch);
        }
        let password = self.password.clone();
        self.encrypt_with(&password, self.params).await?;
        self.password = Zeroizing::default();
        self.confirm_password = Zeroizing::default();
        Ok(())
    }

    /// Encrypt the current key with an explicit password and parameters.
    ///
    /// The blob is written to storage immediately. Key derivation runs on
    /// the blocking pool.
    pub async fn encrypt_with(&mut self, password: &str, params: EncryptionParams) -> Result<()> {
        let key = self.current_key()?;
        if key.is_encrypted() {
            return Err(SettingsError::WrongVariant {
                expected: "plain",
                found: key.variant_name(),
            });
        }
        let secret = key.secret()?;
        let password = Zeroizing::new(password.to_owned());
        let ncryptsec =
            tokio::task::spawn_blocking(move || encrypt_secret(&secret, &password, params))
                .await
                .map_err(|e| KeyError::Encryption(format!("encryption task failed: {e}")))??;

        self.write(ncryptsec.clone()).await?;
        self.input = KeyInput::Key(SigningKey::Encrypted { ncryptsec });
        tracing::info!(
            log_n = params.log_n(),
            security = params.security().as_u8(),
            "encrypted private key"
        );
        Ok(())
    }

    /// Decrypt the current key with the decrypt password buffer.
    pub async fn decrypt(&mut self) -> Result<()> {
        let password = self.decrypt_password.clone();
        self.decrypt_with(&password).await?;
        self.decrypt_password = Zeroizing::default();
        Ok(())
    }

    /// Decrypt the current key with an explicit password.
    ///
    /// A wrong password and a corrupt blob both fail with
    /// [`KeyError::WrongPassword`]. The hex form is written to storage
    /// immediately.
    pub async fn decrypt_with(&mut self, password: &str) -> Result<()> {
        let ncryptsec = match self.current_key()? {
            SigningKey::Encrypted { ncryptsec } => ncryptsec.clone(),
            other => {
                return Err(SettingsError::WrongVariant {
                    expected: "encrypted",
                    found: other.variant_name(),
                })
            }
        };
        let password = Zeroizing::new(password.to_owned());
        let secret = tokio::task::spawn_blocking(move || decrypt_secret(&ncryptsec, &password))
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "decryption task failed");
                KeyError::WrongPassword
            })??;

        self.write(secret.to_hex()).await?;
        self.input = KeyInput::Key(SigningKey::encoded(&secret));
        tracing::info!("decrypted private key");
        Ok(())
    }

    /// Persist the key field.
    ///
    /// Writes `""` when empty, hex for a plain key, and the blob for an
    /// encrypted one. An invalid draft is refused and nothing is written.
    pub async fn save(&mut self) -> Result<()> {
        let key = match &self.input {
            KeyInput::Invalid(_) => {
                return Err(KeyError::Validation("private key is invalid".into()).into())
            }
            KeyInput::Empty => {
                self.write(String::new()).await?;
                tracing::info!("cleared private key");
                return Ok(());
            }
            KeyInput::Key(key) => key,
        };

        self.write(key.storage_form()?).await?;
        tracing::info!(variant = key.variant_name(), "saved private key");

        if let KeyInput::Key(key) = std::mem::take(&mut self.input) {
            self.input = KeyInput::Key(key.into_encoded()?);
        }
        Ok(())
    }

    fn current_key(&self) -> Result<&SigningKey> {
        match &self.input {
            KeyInput::Key(key) => Ok(key),
            KeyInput::Invalid(_) => Err(KeyError::Validation("private key is invalid".into()).into()),
            KeyInput::Empty => Err(SettingsError::NoKey),
        }
    }

    async fn write(&self, value: String) -> Result<()> {
        self.store
            .set(StorageKey::PrivateKey.as_str(), Value::String(value))
            .await?;
        Ok(())
    }
}
