//! # Keyward Testkit
//!
//! Testing utilities for Keyward.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Vectors**: Published NIP-19 and NIP-49 test data
//! - **Generators**: Proptest strategies for keys, parameters, grants, and relay edits
//! - **Fixtures**: Stores and notification prompts for controller tests
//!
//! ## Vectors
//!
//! ```rust
//! use keyward_testkit::vectors::verify_all_vectors;
//!
//! verify_all_vectors().unwrap();
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use keyward_testkit::generators::nsec;
//!
//! proptest! {
//!     #[test]
//!     fn nsec_round_trips(nsec in nsec()) {
//!         let hex = keyward_core::to_canonical_hex(&nsec).unwrap();
//!         prop_assert_eq!(keyward_core::codec::to_display_form(&keyward_core::to_secret(&hex).unwrap()), nsec);
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust,no_run
//! use keyward_testkit::fixtures::{FlakyStore, TestFixture};
//!
//! async fn example() {
//!     let fixture = TestFixture::with_store(FlakyStore::new());
//!     fixture.store.fail_writes("relays");
//!     let mut controller = fixture.controller().await.unwrap();
//!     controller.add_relay("wss://relay.example.com");
//!     assert!(!controller.save().await.is_success());
//! }
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{FlakyStore, ScriptedPermission, TestFixture};
pub use generators::RelayEdit;
pub use vectors::{encoding_vectors, encryption_vectors, verify_all_vectors, EncodingVector, EncryptionVector};
