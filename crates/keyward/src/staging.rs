//! Staged settings changes.
//!
//! Edits mark their domain dirty in a [`ChangeSet`]. Nothing is written until
//! the set is committed, which persists each dirty domain in the order it was
//! first marked. A failed domain does not stop the others and nothing is
//! rolled back; the set is consumed either way.

use std::fmt;

use async_trait::async_trait;
use keyward_store::StorageKey;

use crate::error::{Result, SettingsError};

/// A configuration area that can hold unsaved edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    /// The private key field.
    PrivateKey,
    /// The relay list.
    Relays,
    /// The `nostr:` link handler template.
    ProtocolHandler,
    /// The notifications flag.
    Notifications,
}

impl Domain {
    /// All domains.
    pub const ALL: [Domain; 4] = [
        Self::PrivateKey,
        Self::Relays,
        Self::ProtocolHandler,
        Self::Notifications,
    ];

    /// The storage key this domain is written to.
    pub const fn storage_key(self) -> StorageKey {
        match self {
            Self::PrivateKey => StorageKey::PrivateKey,
            Self::Relays => StorageKey::Relays,
            Self::ProtocolHandler => StorageKey::ProtocolHandler,
            Self::Notifications => StorageKey::Notifications,
        }
    }

    /// Human-readable label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::PrivateKey => "private key",
            Self::Relays => "relays",
            Self::ProtocolHandler => "protocol handler",
            Self::Notifications => "notifications",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.storage_key().as_str())
    }
}

/// Writes one domain's in-memory state to storage.
#[async_trait]
pub trait DomainPersister: Send {
    /// Persist a single domain.
    async fn persist(&mut self, domain: Domain) -> Result<()>;
}

/// The set of domains with pending edits, in first-marked order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    domains: Vec<Domain>,
}

impl ChangeSet {
    /// Create an empty change set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a domain dirty. Marking an already-dirty domain keeps its position.
    pub fn mark_dirty(&mut self, domain: Domain) {
        if !self.domains.contains(&domain) {
            self.domains.push(domain);
        }
    }

    /// Whether a domain has pending edits.
    pub fn is_dirty(&self, domain: Domain) -> bool {
        self.domains.contains(&domain)
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Number of dirty domains.
    pub fn len(&self) -> usize {
        self.domains.len()
    }

    /// Dirty domains in commit order.
    pub fn iter(&self) -> impl Iterator<Item = Domain> + '_ {
        self.domains.iter().copied()
    }

    /// Persist every dirty domain in order and report each outcome.
    pub async fn commit<P>(self, persister: &mut P) -> CommitReport
    where
        P: DomainPersister + ?Sized,
    {
        let mut outcomes = Vec::with_capacity(self.domains.len());
        for domain in self.domains {
            let result = persister.persist(domain).await;
            match &result {
                Ok(()) => tracing::debug!(%domain, "persisted domain"),
                Err(e) => tracing::warn!(%domain, error = %e, "failed to persist domain"),
            }
            outcomes.push(DomainOutcome { domain, result });
        }
        CommitReport { outcomes }
    }
}

/// The result of persisting one domain.
#[derive(Debug)]
pub struct DomainOutcome {
    /// The domain.
    pub domain: Domain,
    /// Whether its write succeeded.
    pub result: Result<()>,
}

/// Per-domain results of a commit, in commit order.
#[derive(Debug, Default)]
pub struct CommitReport {
    outcomes: Vec<DomainOutcome>,
}

impl CommitReport {
    /// All outcomes in commit order.
    pub fn outcomes(&self) -> &[DomainOutcome] {
        &self.outcomes
    }

    /// Domains that were written.
    pub fn succeeded(&self) -> Vec<Domain> {
        self.outcomes
            .iter()
            .filter(|o| o.result.is_ok())
            .map(|o| o.domain)
            .collect()
    }

    /// Domains whose write failed, with the error.
    pub fn failed(&self) -> Vec<(Domain, &SettingsError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.domain, e)))
            .collect()
    }

    /// Whether every domain was written.
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }

    /// Whether nothing was committed.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyward_store::StoreError;
    use proptest::prelude::*;

    #[derive(Default)]
    struct Recorder {
        seen: Vec<Domain>,
        fail: Vec<Domain>,
    }

    #[async_trait]
    impl DomainPersister for Recorder {
        async fn persist(&mut self, domain: Domain) -> Result<()> {
            self.seen.push(domain);
            if self.fail.contains(&domain) {
                return Err(StoreError::Unavailable("quota exceeded".into()).into());
            }
            Ok(())
        }
    }

    #[test]
    fn test_mark_dirty_idempotent() {
        let mut changes = ChangeSet::new();
        changes.mark_dirty(Domain::Relays);
        changes.mark_dirty(Domain::Notifications);
        changes.mark_dirty(Domain::Relays);
        assert_eq!(changes.len(), 2);
        assert_eq!(
            changes.iter().collect::<Vec<_>>(),
            vec![Domain::Relays, Domain::Notifications]
        );
    }

    #[tokio::test]
    async fn test_commit_in_marked_order() {
        let mut changes = ChangeSet::new();
        changes.mark_dirty(Domain::Notifications);
        changes.mark_dirty(Domain::PrivateKey);
        changes.mark_dirty(Domain::Relays);

        let mut recorder = Recorder::default();
        let report = changes.commit(&mut recorder).await;
        assert_eq!(
            recorder.seen,
            vec![Domain::Notifications, Domain::PrivateKey, Domain::Relays]
        );
        assert!(report.is_success());
    }

    #[tokio::test]
    async fn test_partial_commit_continues() {
        let mut changes = ChangeSet::new();
        changes.mark_dirty(Domain::Relays);
        changes.mark_dirty(Domain::Notifications);

        let mut recorder = Recorder {
            fail: vec![Domain::Relays],
            ..Default::default()
        };
        let report = changes.commit(&mut recorder).await;
        assert_eq!(recorder.seen.len(), 2);
        assert_eq!(report.succeeded(), vec![Domain::Notifications]);
        assert_eq!(report.failed().len(), 1);
        assert_eq!(report.failed()[0].0, Domain::Relays);
        assert!(report.failed()[0].1.is_store());
    }

    #[tokio::test]
    async fn test_empty_commit() {
        let mut recorder = Recorder::default();
        let report = ChangeSet::new().commit(&mut recorder).await;
        assert!(report.is_empty());
        assert!(recorder.seen.is_empty());
    }

    fn domain() -> impl Strategy<Value = Domain> {
        prop::sample::select(Domain::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn test_no_duplicates_first_order_kept(marks in prop::collection::vec(domain(), 0..20)) {
            let mut changes = ChangeSet::new();
            for d in &marks {
                changes.mark_dirty(*d);
            }
            let mut expected = Vec::new();
            for d in marks {
                if !expected.contains(&d) {
                    expected.push(d);
                }
            }
            prop_assert_eq!(changes.iter().collect::<Vec<_>>(), expected);
        }
    }
}
