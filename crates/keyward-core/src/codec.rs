//! Key encodings and validity checks.
//!
//! Pure functions over key text. No state.

use bech32::primitives::decode::CheckedHrpstring;
use bech32::{Bech32, Hrp};
use k256::schnorr::SigningKey as SchnorrSigningKey;
use rand::RngCore;
use zeroize::Zeroize;

use crate::error::{KeyError, Result};
use crate::key::SecretKey;

/// Text prefix that marks a password-locked key.
pub const NCRYPTSEC_PREFIX: &str = "ncryptsec";

const NSEC_HRP: Hrp = Hrp::parse_unchecked("nsec");
const NPUB_HRP: Hrp = Hrp::parse_unchecked("npub");

/// Check whether `input` is acceptable key text.
///
/// True for the empty string, any `ncryptsec`-prefixed string (not decoded),
/// 64 lowercase hex characters, or a decodable `nsec`. False otherwise.
pub fn validate(input: &str) -> bool {
    input.is_empty()
        || input.starts_with(NCRYPTSEC_PREFIX)
        || is_hex_secret(input)
        || decode_nsec(input).is_ok()
}

/// Whether `input` is exactly 64 lowercase hex characters.
pub fn is_hex_secret(input: &str) -> bool {
    input.len() == 64 && input.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Decode 64 hex characters into a secret.
pub fn decode_hex(input: &str) -> Result<SecretKey> {
    let mut bytes = [0u8; 32];
    hex::decode_to_slice(input, &mut bytes).map_err(|e| KeyError::Decode(e.to_string()))?;
    let secret = SecretKey::from_bytes(bytes);
    bytes.zeroize();
    Ok(secret)
}

/// Decode an `nsec1...` string into a secret.
pub fn decode_nsec(input: &str) -> Result<SecretKey> {
    let (hrp, mut data) = decode_bech32(input)?;

    if hrp != NSEC_HRP {
        data.zeroize();
        return Err(KeyError::Decode(format!("expected nsec, got {hrp}")));
    }

    let secret = SecretKey::from_slice(&data);
    data.zeroize();
    secret
}

/// Decode bech32 text, accepting only the original BIP-173 checksum.
///
/// NIP-19 and NIP-49 strings never use bech32m, so a bech32m checksum is a
/// decode error here.
pub(crate) fn decode_bech32(input: &str) -> Result<(Hrp, Vec<u8>)> {
    let checked = CheckedHrpstring::new::<Bech32>(input)
        .map_err(|e| KeyError::Decode(format!("invalid bech32: {e}")))?;
    Ok((checked.hrp(), checked.byte_iter().collect()))
}

/// Decode hex or `nsec` text into a secret. Fails for encrypted or malformed input.
pub fn to_secret(input: &str) -> Result<SecretKey> {
    if input.starts_with(NCRYPTSEC_PREFIX) {
        return Err(KeyError::Decode("key is encrypted".into()));
    }
    if is_hex_secret(input) {
        decode_hex(input)
    } else {
        decode_nsec(input)
    }
}

/// Decode hex or `nsec` text into canonical lowercase hex.
pub fn to_canonical_hex(input: &str) -> Result<String> {
    Ok(to_secret(input)?.to_hex())
}

/// Encode a secret as `nsec1...`.
pub fn to_display_form(secret: &SecretKey) -> String {
    // Encoding only fails past the 1023-character checksum limit; a 32-byte
    // payload under a 4-character HRP is 63 characters.
    bech32::encode::<Bech32>(NSEC_HRP, secret.as_bytes())
        .expect("nsec encoding of 32 bytes is within the bech32 length limit")
}

/// Generate a fresh random secret.
///
/// Draws until the bytes are a valid secp256k1 scalar, so the key can sign.
pub fn generate() -> SecretKey {
    let mut rng = rand::thread_rng();
    loop {
        let mut bytes = [0u8; 32];
        rng.fill_bytes(&mut bytes);
        let usable = SchnorrSigningKey::from_bytes(&bytes).is_ok();
        let secret = SecretKey::from_bytes(bytes);
        bytes.zeroize();
        if usable {
            return secret;
        }
    }
}

/// Derive the x-only public key (BIP-340) as hex.
pub fn public_key_hex(secret: &SecretKey) -> Result<String> {
    Ok(hex::encode(public_key_bytes(secret)?))
}

/// Derive the public key as `npub1...`.
pub fn to_npub(secret: &SecretKey) -> Result<String> {
    let public = public_key_bytes(secret)?;
    bech32::encode::<Bech32>(NPUB_HRP, &public).map_err(|e| KeyError::Decode(e.to_string()))
}

fn public_key_bytes(secret: &SecretKey) -> Result<[u8; 32]> {
    let signing_key = SchnorrSigningKey::from_bytes(secret.as_bytes())
        .map_err(|_| KeyError::Decode("not a valid secp256k1 secret".into()))?;
    Ok(signing_key.verifying_key().to_bytes().into())
}
