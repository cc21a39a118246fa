//! # Keyward
//!
//! Settings management for a Nostr signing identity: one private key, its
//! relays, the `nostr:` link handler, the notifications flag, and the
//! per-origin permissions granted to sites.
//!
//! ## Overview
//!
//! - **Key lifecycle**: a key is plain hex, an `nsec1...` string, or a
//!   password-locked `ncryptsec1...` blob, and moves between these forms
//!   through [`KeyEncryptionManager`]
//! - **Staged edits**: key, relay, handler, and notification edits are held
//!   in a [`ChangeSet`] and written only on an explicit save
//! - **Permissions**: grants are listed and revoked through
//!   [`perms::PermissionStore`]
//!
//! ## Key Concepts
//!
//! - **Canonical form**: plain keys are always stored as hex; encrypted keys
//!   as the blob
//! - **Partial commit**: a failed domain write does not stop the others and
//!   the change set is cleared regardless
//! - **Last-known-good**: a failed encrypt, decrypt, or write leaves the
//!   in-memory key as it was
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use keyward::{ControllerConfig, FixedPermission, SettingsController};
//! use keyward::store::SqliteStore;
//!
//! async fn example() {
//!     let store = Arc::new(SqliteStore::open("settings.db").unwrap());
//!     let mut settings =
//!         SettingsController::load(store, Arc::new(FixedPermission(true)), ControllerConfig::default())
//!             .await
//!             .unwrap();
//!
//!     settings.generate_key();
//!     settings.add_relay("wss://relay.example.com");
//!     let report = settings.save().await;
//!     assert!(report.is_success());
//!
//!     settings.set_password("correct horse");
//!     settings.set_confirm_password("correct horse");
//!     settings.encrypt_key().await.unwrap();
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `keyward::core` - Key encodings and password encryption
//! - `keyward::store` - Storage abstraction and SQLite
//! - `keyward::perms` - Permission policies

pub mod controller;
pub mod error;
pub mod handler;
pub mod manager;
pub mod notice;
pub mod notify;
pub mod relays;
pub mod staging;

// Re-export component crates
pub use keyward_core as core;
pub use keyward_perms as perms;
pub use keyward_store as store;

pub use controller::{ControllerConfig, SettingsController, DEFAULT_PROTOCOL_HANDLER};
pub use error::{Result, SettingsError};
pub use handler::{Placeholder, ProtocolHandlerConfig};
pub use manager::KeyEncryptionManager;
pub use notice::{Notice, NoticeBoard, NoticeLevel};
pub use notify::{FixedPermission, NotificationPermission, NOTIFICATIONS_CAPABILITY};
pub use relays::{RelayAccess, RelayEntry, RelayList, RelayMap, RelayPolicy};
pub use staging::{ChangeSet, CommitReport, Domain, DomainOutcome, DomainPersister};

pub use keyward_core::{EncryptionParams, KeyInput, KeySecurity, SigningKey};
pub use keyward_perms::{Conditions, Decision, PermissionGrant};
