//! Signing key representations.
//!
//! A key lives in exactly one of three forms. The form is decided once, when
//! text enters the system (load, paste, generate, encrypt, decrypt), and
//! downstream code matches on the variant instead of re-inspecting strings.

use std::fmt;

use zeroize::Zeroize;

use crate::codec::{self, NCRYPTSEC_PREFIX};
use crate::error::{KeyError, Result};

/// A 32-byte secret key. Zeroized on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey([u8; 32]);

impl SecretKey {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Create from a slice, which must be exactly 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| KeyError::Decode(format!("expected 32 bytes, got {}", bytes.len())))?;
        Ok(Self(arr))
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex, the on-disk form of a plain key.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

/// A configured signing key.
#[derive(Clone, PartialEq, Eq)]
pub enum SigningKey {
    /// Raw secret bytes.
    Plain {
        /// The secret.
        secret: SecretKey,
    },
    /// The same secret in its shareable `nsec1...` encoding.
    EncodedPlain {
        /// The bech32 text.
        nsec: String,
    },
    /// A password-locked `ncryptsec1...` blob.
    Encrypted {
        /// The opaque blob.
        ncryptsec: String,
    },
}

impl SigningKey {
    /// Classify well-formed key text.
    ///
    /// Strings starting with `ncryptsec` are accepted as encrypted without
    /// decoding them; the blob is only checked when it is decrypted.
    pub fn parse(input: &str) -> Result<Self> {
        if input.starts_with(NCRYPTSEC_PREFIX) {
            return Ok(Self::Encrypted {
                ncryptsec: input.to_string(),
            });
        }
        if codec::is_hex_secret(input) {
            return Ok(Self::Plain {
                secret: codec::decode_hex(input)?,
            });
        }
        codec::decode_nsec(input)?;
        Ok(Self::EncodedPlain {
            nsec: input.to_string(),
        })
    }

    /// Wrap freshly generated or decrypted secret bytes in the display form.
    pub fn encoded(secret: &SecretKey) -> Self {
        Self::EncodedPlain {
            nsec: codec::to_display_form(secret),
        }
    }

    /// Whether the secret is usable without a password.
    pub fn is_plain(&self) -> bool {
        !self.is_encrypted()
    }

    /// Whether the key is password-locked.
    pub fn is_encrypted(&self) -> bool {
        matches!(self, Self::Encrypted { .. })
    }

    /// Variant name, safe to log.
    pub fn variant_name(&self) -> &'static str {
        match self {
            Self::Plain { .. } => "plain",
            Self::EncodedPlain { .. } => "encoded-plain",
            Self::Encrypted { .. } => "encrypted",
        }
    }

    /// The raw secret. Fails for encrypted keys.
    pub fn secret(&self) -> Result<SecretKey> {
        match self {
            Self::Plain { secret } => Ok(secret.clone()),
            Self::EncodedPlain { nsec } => codec::decode_nsec(nsec),
            Self::Encrypted { .. } => Err(KeyError::Decode(
                "key is encrypted; decrypt it first".into(),
            )),
        }
    }

    /// The canonical on-disk form: hex for plain keys, the blob for encrypted ones.
    pub fn storage_form(&self) -> Result<String> {
        match self {
            Self::Encrypted { ncryptsec } => Ok(ncryptsec.clone()),
            _ => Ok(self.secret()?.to_hex()),
        }
    }

    /// The form shown to the user: `nsec1...` or `ncryptsec1...`.
    pub fn display_form(&self) -> Result<String> {
        match self {
            Self::Plain { secret } => Ok(codec::to_display_form(secret)),
            Self::EncodedPlain { nsec } => Ok(nsec.clone()),
            Self::Encrypted { ncryptsec } => Ok(ncryptsec.clone()),
        }
    }

    /// Normalise a plain key to its encoded form. Encrypted keys are unchanged.
    pub fn into_encoded(self) -> Result<Self> {
        match self {
            Self::Plain { secret } => Ok(Self::encoded(&secret)),
            other => Ok(other),
        }
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encrypted { ncryptsec } => f
                .debug_struct("Encrypted")
                .field("ncryptsec", ncryptsec)
                .finish(),
            other => write!(f, "SigningKey::{}(<redacted>)", other.variant_name()),
        }
    }
}

/// The key field as the user sees it.
///
/// A malformed draft is kept so it can be shown and corrected, but it is never
/// a [`SigningKey`] and can never be persisted.
#[derive(Clone, PartialEq, Eq, Default)]
pub enum KeyInput {
    /// No key configured.
    #[default]
    Empty,
    /// A well-formed key.
    Key(SigningKey),
    /// Text that failed validation.
    Invalid(String),
}

impl KeyInput {
    /// Interpret user-typed text. The text is trimmed and lowercased first.
    pub fn from_text(text: &str) -> Self {
        let normalized = text.trim().to_lowercase();
        if normalized.is_empty() {
            return Self::Empty;
        }
        match SigningKey::parse(&normalized) {
            Ok(key) => Self::Key(key),
            Err(_) => Self::Invalid(normalized),
        }
    }

    /// Interpret a value read back from storage (hex or blob).
    ///
    /// Plain keys are presented in their encoded form.
    pub fn from_stored(stored: &str) -> Self {
        if stored.is_empty() {
            return Self::Empty;
        }
        match SigningKey::parse(stored).and_then(SigningKey::into_encoded) {
            Ok(key) => Self::Key(key),
            Err(_) => Self::Invalid(stored.to_string()),
        }
    }

    /// Whether this input passes the validity predicate.
    pub fn is_valid(&self) -> bool {
        !matches!(self, Self::Invalid(_))
    }

    /// Whether no key is configured.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// The configured key, if any.
    pub fn key(&self) -> Option<&SigningKey> {
        match self {
            Self::Key(key) => Some(key),
            _ => None,
        }
    }

    /// The text shown in the key field.
    pub fn text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Key(key) => key.display_form().unwrap_or_default(),
            Self::Invalid(text) => text.clone(),
        }
    }
}

impl fmt::Debug for KeyInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("KeyInput::Empty"),
            Self::Key(key) => write!(f, "KeyInput::Key({key:?})"),
            Self::Invalid(_) => f.write_str("KeyInput::Invalid(<redacted>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEX: &str = "67dea2ed018072d675f5415ecfaed7d2597555e202d85b3d65ea4e58d2d92ffa";
    const NSEC: &str = "nsec1vl029mgpspedva04g90vltkh6fvh240zqtv9k0t9af8935ke9laqsnlfe5";

    #[test]
    fn test_parse_variants() {
        assert!(matches!(SigningKey::parse(HEX), Ok(SigningKey::Plain { .. })));
        assert!(matches!(
            SigningKey::parse(NSEC),
            Ok(SigningKey::EncodedPlain { .. })
        ));
        assert!(matches!(
            SigningKey::parse("ncryptsec1whatever"),
            Ok(SigningKey::Encrypted { .. })
        ));
        assert!(SigningKey::parse("not-a-key").is_err());
    }

    #[test]
    fn test_storage_form_is_hex_for_plain() {
        let key = SigningKey::parse(NSEC).unwrap();
        assert_eq!(key.storage_form().unwrap(), HEX);

        let key = SigningKey::parse(HEX).unwrap();
        assert_eq!(key.display_form().unwrap(), NSEC);
    }

    #[test]
    fn test_encrypted_has_no_secret() {
        let key = SigningKey::parse("ncryptsec1abc").unwrap();
        assert!(key.secret().is_err());
        assert_eq!(key.storage_form().unwrap(), "ncryptsec1abc");
    }

    #[test]
    fn test_key_input_normalizes() {
        let input = KeyInput::from_text(&format!("  {}  ", NSEC.to_uppercase()));
        assert_eq!(input.text(), NSEC);
        assert!(input.is_valid());

        assert_eq!(KeyInput::from_text("   "), KeyInput::Empty);
        assert!(!KeyInput::from_text("garbage").is_valid());
    }

    #[test]
    fn test_from_stored_presents_encoded() {
        let input = KeyInput::from_stored(HEX);
        assert!(matches!(
            input.key(),
            Some(SigningKey::EncodedPlain { .. })
        ));
        assert_eq!(input.text(), NSEC);
        assert!(!KeyInput::from_stored("zz").is_valid());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let key = SigningKey::parse(NSEC).unwrap();
        let rendered = format!("{key:?}");
        assert!(!rendered.contains(NSEC));
        assert!(!format!("{:?}", key.secret().unwrap()).contains(HEX));
    }
}
