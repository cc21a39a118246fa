//! Proptest generators for property-based testing.

use proptest::prelude::*;

use keyward::{Domain, RelayAccess};
use keyward_core::{codec, EncryptionParams, KeySecurity, SecretKey, MAX_LOG_N, MIN_LOG_N};
use keyward_perms::{Conditions, Decision};

/// Generate a secret that is a valid secp256k1 scalar.
pub fn secret_key() -> impl Strategy<Value = SecretKey> {
    any::<[u8; 32]>()
        .prop_map(SecretKey::from_bytes)
        .prop_filter("valid secp256k1 scalar", |secret| {
            codec::public_key_hex(secret).is_ok()
        })
}

/// Generate a 64-character lowercase hex secret.
pub fn hex_secret() -> impl Strategy<Value = String> {
    secret_key().prop_map(|secret| secret.to_hex())
}

/// Generate an `nsec1...` string.
pub fn nsec() -> impl Strategy<Value = String> {
    secret_key().prop_map(|secret| codec::to_display_form(&secret))
}

/// Generate a cost exponent in the offered range.
pub fn log_n() -> impl Strategy<Value = u8> {
    MIN_LOG_N..=MAX_LOG_N
}

/// Generate a cheap cost exponent, for tests that encrypt many times.
pub fn cheap_log_n() -> impl Strategy<Value = u8> {
    MIN_LOG_N..=4u8
}

/// Generate a key security byte.
pub fn key_security() -> impl Strategy<Value = KeySecurity> {
    prop::sample::select(KeySecurity::ALL.to_vec())
}

/// Generate cheap encryption parameters.
pub fn encryption_params() -> impl Strategy<Value = EncryptionParams> {
    (cheap_log_n(), key_security()).prop_filter_map("in range", |(log_n, security)| {
        EncryptionParams::new(log_n, security).ok()
    })
}

/// Generate a non-empty password, including non-ASCII text.
pub fn password() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ÅΩ€]{1,24}".prop_map(String::from)
}

/// Generate an origin.
pub fn origin() -> impl Strategy<Value = String> {
    "https://[a-e]\\.example".prop_map(String::from)
}

/// Generate a decision.
pub fn decision() -> impl Strategy<Value = Decision> {
    prop_oneof![Just(Decision::Allow), Just(Decision::Deny)]
}

/// Generate an operation type.
pub fn operation_type() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("getPublicKey".to_string()),
        Just("signEvent".to_string()),
        Just("nip04.encrypt".to_string()),
        Just("nip44.decrypt".to_string()),
    ]
}

/// Generate grant conditions.
pub fn conditions() -> impl Strategy<Value = Conditions> {
    prop_oneof![
        Just(Conditions::always()),
        prop::collection::btree_set(0u32..40_000, 1..4).prop_map(|kinds| Conditions::kinds(kinds)),
    ]
}

/// Generate a relay URL, sometimes padded or blank.
pub fn relay_url() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => "wss://[a-d]\\.relay\\.example".prop_map(String::from),
        1 => " wss://[a-d]\\.relay\\.example ".prop_map(String::from),
        1 => " {0,3}".prop_map(String::from),
    ]
}

/// Generate a relay access flag.
pub fn relay_access() -> impl Strategy<Value = RelayAccess> {
    prop_oneof![Just(RelayAccess::Read), Just(RelayAccess::Write)]
}

/// Generate a settings domain.
pub fn domain() -> impl Strategy<Value = Domain> {
    prop::sample::select(Domain::ALL.to_vec())
}

/// An edit to a relay list.
#[derive(Debug, Clone)]
pub enum RelayEdit {
    /// Append a URL.
    Add(String),
    /// Replace the URL at an index.
    SetUrl(usize, String),
    /// Flip one flag at an index.
    Toggle(usize, RelayAccess),
    /// Remove the entry at an index.
    Remove(usize),
}

/// Generate a relay edit. Indices may be out of range.
pub fn relay_edit() -> impl Strategy<Value = RelayEdit> {
    prop_oneof![
        relay_url().prop_map(RelayEdit::Add),
        (0usize..6, relay_url()).prop_map(|(i, url)| RelayEdit::SetUrl(i, url)),
        (0usize..6, relay_access()).prop_map(|(i, access)| RelayEdit::Toggle(i, access)),
        (0usize..6).prop_map(RelayEdit::Remove),
    ]
}
