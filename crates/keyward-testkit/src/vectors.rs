//! Known-answer vectors for key encodings and password encryption.
//!
//! Published test data from NIP-19 and NIP-49, so independent
//! implementations can be checked against the same values.

use keyward_core::{codec, decrypt_secret, KeyError};

/// A secret in its hex and `nsec` forms.
#[derive(Debug, Clone)]
pub struct EncodingVector {
    /// Short label for failure messages.
    pub name: &'static str,
    /// Secret as 64 hex characters.
    pub hex: &'static str,
    /// The same secret as `nsec`.
    pub nsec: &'static str,
}

/// An encrypted secret with its password and plaintext.
#[derive(Debug, Clone)]
pub struct EncryptionVector {
    /// Short label for failure messages.
    pub name: &'static str,
    /// The encrypted blob.
    pub ncryptsec: &'static str,
    /// Password that opens it.
    pub password: &'static str,
    /// Scrypt cost recorded in the blob.
    pub log_n: u8,
    /// Expected secret as hex.
    pub hex: &'static str,
}

/// Encoding vectors.
pub fn encoding_vectors() -> Vec<EncodingVector> {
    vec![EncodingVector {
        name: "NIP-19 private key",
        hex: "67dea2ed018072d675f5415ecfaed7d2597555e202d85b3d65ea4e58d2d92ffa",
        nsec: "nsec1vl029mgpspedva04g90vltkh6fvh240zqtv9k0t9af8935ke9laqsnlfe5",
    }]
}

/// Encryption vectors.
pub fn encryption_vectors() -> Vec<EncryptionVector> {
    vec![EncryptionVector {
        name: "NIP-49 decryption",
        ncryptsec: "ncryptsec1qgg9947rlpvqu76pj5ecreduf9jxhselq2nae2kghhvd5g7dgjtcxfqtd67p9m0w57lspw8gsq6yphnm8623nsl8xn9j4jdzz84zm3frztj3z7s35vpzmqf6ksu8r89qk5z2zxfmu5gv8th8wclt0h4p",
        password: "nostr",
        log_n: 16,
        hex: "3501454135014541350145413501453fefb02227e449e57cf4d3a3ce05378683",
    }]
}

/// Check every vector, returning the first mismatch.
pub fn verify_all_vectors() -> Result<(), String> {
    for v in encoding_vectors() {
        let hex = codec::to_canonical_hex(v.nsec).map_err(|e| format!("{}: {e}", v.name))?;
        if hex != v.hex {
            return Err(format!("{}: decoded {hex}, expected {}", v.name, v.hex));
        }
        let secret = codec::to_secret(v.hex).map_err(|e| format!("{}: {e}", v.name))?;
        let nsec = codec::to_display_form(&secret);
        if nsec != v.nsec {
            return Err(format!("{}: encoded {nsec}, expected {}", v.name, v.nsec));
        }
    }
    for v in encryption_vectors() {
        let secret = decrypt_secret(v.ncryptsec, v.password).map_err(|e| format!("{}: {e}", v.name))?;
        if secret.to_hex() != v.hex {
            return Err(format!("{}: decrypted to a different key", v.name));
        }
        if !matches!(decrypt_secret(v.ncryptsec, "wrong"), Err(KeyError::WrongPassword)) {
            return Err(format!("{}: wrong password was not rejected", v.name));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_vectors_pass() {
        verify_all_vectors().unwrap();
    }
}
