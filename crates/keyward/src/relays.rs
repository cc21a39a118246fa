//! The relay list.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Read and write permissions for one relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayPolicy {
    /// Read events from the relay.
    pub read: bool,
    /// Publish events to the relay.
    pub write: bool,
}

impl Default for RelayPolicy {
    fn default() -> Self {
        Self {
            read: true,
            write: true,
        }
    }
}

/// Which half of a relay policy to flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayAccess {
    /// The read flag.
    Read,
    /// The write flag.
    Write,
}

/// A relay URL with its policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayEntry {
    /// URL as typed; trimmed only when persisted.
    pub url: String,
    /// Read and write flags.
    pub policy: RelayPolicy,
}

impl RelayEntry {
    /// A new entry with read and write enabled.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            policy: RelayPolicy::default(),
        }
    }
}

/// The persisted form: trimmed URL to policy.
pub type RelayMap = BTreeMap<String, RelayPolicy>;

/// An ordered relay list with snapshot reads.
///
/// Every edit builds a new list and swaps it in, so a snapshot taken before
/// an edit never changes underneath its holder. Duplicate URLs are allowed
/// and edited independently.
#[derive(Debug, Clone)]
pub struct RelayList {
    entries: Arc<[RelayEntry]>,
}

impl Default for RelayList {
    fn default() -> Self {
        Self {
            entries: Vec::new().into(),
        }
    }
}

impl RelayList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the stored mapping. Entries with a malformed policy are skipped.
    pub fn from_stored(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            tracing::warn!("stored relays are not a mapping, ignoring");
            return Self::new();
        };
        let entries: Vec<RelayEntry> = map
            .iter()
            .filter_map(|(url, policy)| {
                match serde_json::from_value::<RelayPolicy>(policy.clone()) {
                    Ok(policy) => Some(RelayEntry {
                        url: url.clone(),
                        policy,
                    }),
                    Err(e) => {
                        tracing::warn!(%url, error = %e, "skipping malformed relay policy");
                        None
                    }
                }
            })
            .collect();
        Self {
            entries: entries.into(),
        }
    }

    /// The current entries.
    pub fn entries(&self) -> &[RelayEntry] {
        &self.entries
    }

    /// A shared snapshot of the current entries.
    pub fn snapshot(&self) -> Arc<[RelayEntry]> {
        Arc::clone(&self.entries)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the list has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a relay with read and write enabled. Blank URLs are ignored.
    pub fn add(&mut self, url: &str) -> bool {
        if url.trim().is_empty() {
            return false;
        }
        self.replace(|entries| entries.push(RelayEntry::new(url)));
        true
    }

    /// Change the URL at `index`.
    pub fn set_url(&mut self, index: usize, url: &str) -> bool {
        self.edit(index, |entry| entry.url = url.to_string())
    }

    /// Flip read or write at `index`.
    pub fn toggle(&mut self, index: usize, access: RelayAccess) -> bool {
        self.edit(index, |entry| match access {
            RelayAccess::Read => entry.policy.read = !entry.policy.read,
            RelayAccess::Write => entry.policy.write = !entry.policy.write,
        })
    }

    /// Remove the entry at `index`.
    pub fn remove(&mut self, index: usize) -> bool {
        if index >= self.entries.len() {
            return false;
        }
        self.replace(|entries| {
            entries.remove(index);
        });
        true
    }

    /// The persisted mapping. Blank URLs are dropped and a later duplicate
    /// overrides an earlier one.
    pub fn to_stored(&self) -> RelayMap {
        self.entries
            .iter()
            .filter(|entry| !entry.url.trim().is_empty())
            .map(|entry| (entry.url.trim().to_string(), entry.policy))
            .collect()
    }

    fn edit(&mut self, index: usize, f: impl FnOnce(&mut RelayEntry)) -> bool {
        if index >= self.entries.len() {
            return false;
        }
        self.replace(|entries| f(&mut entries[index]));
        true
    }

    fn replace(&mut self, f: impl FnOnce(&mut Vec<RelayEntry>)) {
        let mut next = self.entries.to_vec();
        f(&mut next);
        self.entries = next.into();
    }
}
