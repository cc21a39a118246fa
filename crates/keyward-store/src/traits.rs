//! Store trait: the abstract interface for settings persistence.
//!
//! This trait keeps the settings logic storage-agnostic. Implementations
//! include SQLite (primary) and in-memory (for tests).

use std::collections::HashMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{Result, StoreError};

/// The Store trait: async string-keyed persistence of JSON-shaped values.
///
/// # Design Notes
///
/// - **Whole-value writes**: `set` replaces the value under a key; there are no
///   partial updates. Callers read, modify, and write back.
/// - **Absent is not an error**: reading a missing key yields `None`.
/// - **Awaited writes**: a write has completed (or failed) when the future resolves.
#[async_trait]
pub trait Store: Send + Sync {
    /// Read a single value.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Read several values at once. Missing keys are omitted from the result.
    async fn get_many(&self, keys: &[&str]) -> Result<HashMap<String, Value>> {
        let mut out = HashMap::with_capacity(keys.len());
        for key in keys {
            if let Some(value) = self.get(key).await? {
                out.insert((*key).to_string(), value);
            }
        }
        Ok(out)
    }

    /// Write a value, replacing any previous one.
    async fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Delete a value. Deleting a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Extension trait for typed reads and writes.
pub trait StoreExt: Store {
    /// Read and deserialize a value.
    fn get_typed<T: DeserializeOwned + Send>(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<T>>> + Send;

    /// Serialize and write a value.
    fn set_typed<T: Serialize + Sync>(
        &self,
        key: &str,
        value: &T,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

impl<S: Store + ?Sized> StoreExt for S {
    async fn get_typed<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key).await? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| StoreError::InvalidData {
                    key: key.to_string(),
                    reason: e.to_string(),
                }),
            None => Ok(None),
        }
    }

    async fn set_typed<T: Serialize + Sync>(&self, key: &str, value: &T) -> Result<()> {
        let value =
            serde_json::to_value(value).map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.set(key, value).await
    }
}
