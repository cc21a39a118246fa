//! # Keyward Store
//!
//! Storage abstraction for Keyward settings. Provides a trait-based interface
//! for string-keyed persistence with SQLite and in-memory implementations.
//!
//! ## Overview
//!
//! The store module abstracts the persistent key-value substrate behind the
//! [`Store`] trait, allowing the settings logic to be storage-agnostic. The
//! primary implementation is [`SqliteStore`], with [`MemoryStore`] for testing.
//!
//! ## Key Types
//!
//! - [`Store`] - The async trait for all storage operations
//! - [`StoreExt`] - Typed reads and writes on top of [`Store`]
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//! - [`StorageKey`] - The well-known keys (`private_key`, `relays`, ...)
//!
//! ## Usage
//!
//! ```rust,no_run
//! use keyward_store::{SqliteStore, StorageKey, Store};
//! use serde_json::json;
//!
//! async fn example() {
//!     let store = SqliteStore::open("keyward.db").unwrap();
//!     store
//!         .set(StorageKey::Notifications.as_str(), json!(true))
//!         .await
//!         .unwrap();
//! }
//! ```

pub mod error;
pub mod keys;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use keys::StorageKey;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{Store, StoreExt};
