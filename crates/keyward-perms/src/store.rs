//! Permission store backed by the settings [`Store`].
//!
//! Reads and writes the `policies` value. The persisted tree is authoritative:
//! every operation re-reads it, and nothing is cached between calls.

use std::sync::Arc;

use keyward_store::{StorageKey, Store, StoreExt};
use tokio::sync::Mutex;

use crate::error::Result;
use crate::grant::{Conditions, Decision, PermissionGrant};
use crate::state::PolicyTable;

/// Loads, grants, and revokes permissions in persistent storage.
pub struct PermissionStore<S: Store> {
    store: Arc<S>,
    /// Serialises read-modify-write cycles on the policy tree.
    write_lock: Mutex<()>,
}

impl<S: Store> PermissionStore<S> {
    /// Create a permission store over a settings store.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Read the full policy tree. A missing value is an empty tree.
    pub async fn table(&self) -> Result<PolicyTable> {
        Ok(self
            .store
            .get_typed::<PolicyTable>(StorageKey::Policies.as_str())
            .await?
            .unwrap_or_default())
    }

    /// Read and flatten all grants.
    pub async fn load(&self) -> Result<Vec<PermissionGrant>> {
        let grants = self.table().await?.flatten();
        tracing::debug!(count = grants.len(), "loaded permissions");
        Ok(grants)
    }

    /// Record a grant, replacing any existing grant with the same key.
    pub async fn grant(
        &self,
        origin: &str,
        decision: Decision,
        operation_type: &str,
        conditions: Conditions,
    ) -> Result<()> {
        self.grant_at(
            origin,
            decision,
            operation_type,
            conditions,
            chrono::Utc::now().timestamp(),
        )
        .await
    }

    /// Record a grant with an explicit timestamp (Unix seconds).
    pub async fn grant_at(
        &self,
        origin: &str,
        decision: Decision,
        operation_type: &str,
        conditions: Conditions,
        created_at: i64,
    ) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut table = self.table().await?;
        table.insert(origin, decision, operation_type, conditions, created_at);
        self.store
            .set_typed(StorageKey::Policies.as_str(), &table)
            .await?;
        tracing::debug!(%origin, %decision, %operation_type, "recorded permission");
        Ok(())
    }

    /// Revoke one grant and return the refreshed list.
    ///
    /// Revoking a grant that does not exist is a no-op and writes nothing.
    pub async fn revoke(
        &self,
        origin: &str,
        decision: Decision,
        operation_type: &str,
    ) -> Result<Vec<PermissionGrant>> {
        {
            let _guard = self.write_lock.lock().await;
            let mut table = self.table().await?;
            if table.revoke(origin, decision, operation_type) {
                self.store
                    .set_typed(StorageKey::Policies.as_str(), &table)
                    .await?;
                tracing::info!(%origin, %decision, %operation_type, "revoked permission");
            } else {
                tracing::debug!(%origin, %decision, %operation_type, "nothing to revoke");
            }
        }
        self.load().await
    }

    /// The stored decision for a request, if any grant applies.
    pub async fn decision_for(
        &self,
        origin: &str,
        operation_type: &str,
        kind: Option<u32>,
    ) -> Result<Option<Decision>> {
        Ok(self.table().await?.decision_for(origin, operation_type, kind))
    }
}
