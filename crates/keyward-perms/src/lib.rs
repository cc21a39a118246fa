//! # Keyward Permissions
//!
//! Per-origin signing permissions.
//!
//! ## Overview
//!
//! Each grant records an allow or deny decision for one operation type
//! requested by one origin, optionally narrowed by conditions such as a set
//! of event kinds. Grants live in a three-level tree:
//!
//! ```text
//! origin -> decision ("true" | "false") -> operation type -> {conditions, created_at}
//! ```
//!
//! ## Key Concepts
//!
//! - **Grant**: at most one per `(origin, decision, operation type)`; the last write wins
//! - **Revoke**: removes exactly one leaf; revoking a missing leaf is a no-op
//! - **Decision lookup**: a matching deny wins over a matching allow
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use keyward_perms::{Conditions, Decision, PermissionStore};
//! use keyward_store::MemoryStore;
//!
//! async fn example() {
//!     let perms = PermissionStore::new(Arc::new(MemoryStore::new()));
//!     perms
//!         .grant("https://example.com", Decision::Allow, "signEvent", Conditions::kinds([1]))
//!         .await
//!         .unwrap();
//!     let grants = perms
//!         .revoke("https://example.com", Decision::Allow, "signEvent")
//!         .await
//!         .unwrap();
//!     assert!(grants.is_empty());
//! }
//! ```

pub mod error;
pub mod grant;
pub mod state;
pub mod store;

pub use error::{PermsError, Result};
pub use grant::{Conditions, Decision, GrantRecord, PermissionGrant};
pub use state::PolicyTable;
pub use store::PermissionStore;
