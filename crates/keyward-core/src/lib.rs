//! # Keyward Core
//!
//! Pure primitives for Keyward: secret keys, their textual encodings, and
//! password encryption.
//!
//! This crate contains no I/O and no storage. It is pure computation over key
//! material.
//!
//! ## Key Types
//!
//! - [`SecretKey`] - 32 secret bytes, zeroized on drop
//! - [`SigningKey`] - A key in one of three forms: plain, encoded (`nsec`), or encrypted (`ncryptsec`)
//! - [`KeyInput`] - The key field as typed, including malformed drafts
//! - [`EncryptionParams`] - Cost exponent and key security byte for encryption
//!
//! ## Encodings
//!
//! Plain keys are stored as 64-character lowercase hex and shown as NIP-19
//! `nsec1...` strings. Encrypted keys use NIP-49 (`ncryptsec1...`): scrypt key
//! derivation followed by XChaCha20-Poly1305. See the [`envelope`] module.
//!
//! ## Usage
//!
//! ```rust
//! use keyward_core::{codec, decrypt_secret, encrypt_secret, EncryptionParams, KeySecurity};
//!
//! let secret = codec::generate();
//! let nsec = codec::to_display_form(&secret);
//! assert!(codec::validate(&nsec));
//!
//! let params = EncryptionParams::new(4, KeySecurity::Secure).unwrap();
//! let blob = encrypt_secret(&secret, "correct horse", params).unwrap();
//! assert_eq!(decrypt_secret(&blob, "correct horse").unwrap(), secret);
//! ```

pub mod codec;
pub mod crypto;
pub mod envelope;
pub mod error;
pub mod key;
pub mod types;

pub use codec::{
    generate, to_canonical_hex, to_display_form, to_npub, to_secret, validate, NCRYPTSEC_PREFIX,
};
pub use envelope::{decrypt_secret, encrypt_secret, EncryptedKeyEnvelope};
pub use error::{KeyError, Result};
pub use key::{KeyInput, SecretKey, SigningKey};
pub use types::{EncryptionParams, KeySecurity, MAX_LOG_N, MIN_LOG_N};
