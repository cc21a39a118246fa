//! In-memory implementation of the Store trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{Result, StoreError};
use crate::traits::Store;

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with values.
    pub fn with_values<I, K>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self {
            inner: RwLock::new(values.into_iter().map(|(k, v)| (k.into(), v)).collect()),
        }
    }

    /// Copy of everything currently stored.
    pub fn snapshot(&self) -> Result<HashMap<String, Value>> {
        Ok(self.read()?.clone())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, Value>>> {
        self.inner
            .read()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {e}")))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, Value>>> {
        self.inner
            .write()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {e}")))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.read()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.write()?.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.write()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::StorageKey;
    use crate::traits::StoreExt;
    use serde_json::json;

    #[tokio::test]
    async fn test_memory_store_basic() {
        let store = MemoryStore::new();
        assert_eq!(store.get("private_key").await.unwrap(), None);

        store.set("private_key", json!("abcd")).await.unwrap();
        assert_eq!(
            store.get("private_key").await.unwrap(),
            Some(json!("abcd"))
        );

        store.set("private_key", json!("ef")).await.unwrap();
        assert_eq!(store.get("private_key").await.unwrap(), Some(json!("ef")));

        store.remove("private_key").await.unwrap();
        store.remove("private_key").await.unwrap();
        assert_eq!(store.get("private_key").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_get_many_omits_missing() {
        let store = MemoryStore::with_values([
            (StorageKey::Notifications.as_str(), json!(true)),
            (StorageKey::ProtocolHandler.as_str(), json!("https://njump.me/{raw}")),
        ]);

        let values = store
            .get_many(&["notifications", "protocol_handler", "relays"])
            .await
            .unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values["notifications"], json!(true));
        assert!(!values.contains_key("relays"));
    }

    #[tokio::test]
    async fn test_typed_access() {
        let store = MemoryStore::new();
        store.set_typed("notifications", &true).await.unwrap();
        assert_eq!(
            store.get_typed::<bool>("notifications").await.unwrap(),
            Some(true)
        );

        store.set("notifications", json!("yes")).await.unwrap();
        assert!(matches!(
            store.get_typed::<bool>("notifications").await,
            Err(StoreError::InvalidData { .. })
        ));
    }
}
