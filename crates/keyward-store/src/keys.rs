//! Well-known storage keys.

use std::fmt;

/// The keys Keyward reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StorageKey {
    /// Hex secret or `ncryptsec` blob.
    PrivateKey,
    /// Mapping of relay URL to `{read, write}`.
    Relays,
    /// Protocol handler URL template.
    ProtocolHandler,
    /// Whether to notify when permissions are used.
    Notifications,
    /// origin -> decision -> operation type -> grant.
    Policies,
}

impl StorageKey {
    /// All keys.
    pub const ALL: [StorageKey; 5] = [
        Self::PrivateKey,
        Self::Relays,
        Self::ProtocolHandler,
        Self::Notifications,
        Self::Policies,
    ];

    /// The string key used by the backend.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PrivateKey => "private_key",
            Self::Relays => "relays",
            Self::ProtocolHandler => "protocol_handler",
            Self::Notifications => "notifications",
            Self::Policies => "policies",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
