//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use keyward::{ControllerConfig, NotificationPermission, SettingsController};
use keyward_store::{MemoryStore, Result, Store, StoreError};
use serde_json::Value;

/// A notification prompt that answers from a script and records each request.
#[derive(Debug, Default)]
pub struct ScriptedPermission {
    answers: Mutex<VecDeque<bool>>,
    fallback: bool,
    requests: Mutex<Vec<String>>,
}

impl ScriptedPermission {
    /// Answer every request with `answer`.
    pub fn always(answer: bool) -> Self {
        Self {
            fallback: answer,
            ..Default::default()
        }
    }

    /// Answer requests in order, then fall back to denying.
    pub fn scripted(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            ..Default::default()
        }
    }

    /// Capabilities requested so far.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl NotificationPermission for ScriptedPermission {
    async fn request(&self, capability: &str) -> bool {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(capability.to_string());
        }
        self.answers
            .lock()
            .ok()
            .and_then(|mut a| a.pop_front())
            .unwrap_or(self.fallback)
    }
}

/// A memory store whose writes to chosen keys fail.
#[derive(Debug, Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    failing: Mutex<HashSet<String>>,
}

impl FlakyStore {
    /// Create an empty store with no failures.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with initial values.
    pub fn with_values<I, K>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self {
            inner: MemoryStore::with_values(values),
            failing: Mutex::default(),
        }
    }

    /// Make writes to `key` fail until [`heal`](Self::heal) is called.
    pub fn fail_writes(&self, key: &str) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.insert(key.to_string());
        }
    }

    /// Let all writes succeed again.
    pub fn heal(&self) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.clear();
        }
    }

    fn should_fail(&self, key: &str) -> bool {
        self.failing
            .lock()
            .map(|failing| failing.contains(key))
            .unwrap_or(false)
    }
}

#[async_trait]
impl Store for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        if self.should_fail(key) {
            return Err(StoreError::Unavailable(format!("write to {key} refused")));
        }
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        if self.should_fail(key) {
            return Err(StoreError::Unavailable(format!("remove of {key} refused")));
        }
        self.inner.remove(key).await
    }
}

/// A store and notification prompt ready to build a controller.
pub struct TestFixture<S: Store = MemoryStore> {
    /// Backing store, shared with every controller built here.
    pub store: Arc<S>,
    /// Scripted notification permission.
    pub notifier: Arc<ScriptedPermission>,
    /// Controller configuration.
    pub config: ControllerConfig,
}

impl TestFixture<MemoryStore> {
    /// An empty memory store that grants notification requests.
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new())
    }

    /// A memory store seeded with `values`.
    pub fn with_values<I, K>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self::with_store(MemoryStore::with_values(values))
    }
}

impl Default for TestFixture<MemoryStore> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Store + 'static> TestFixture<S> {
    /// Wrap an existing store.
    pub fn with_store(store: S) -> Self {
        Self {
            store: Arc::new(store),
            notifier: Arc::new(ScriptedPermission::always(true)),
            config: ControllerConfig::default(),
        }
    }

    /// Replace the notification prompt.
    pub fn notifier(mut self, notifier: ScriptedPermission) -> Self {
        self.notifier = Arc::new(notifier);
        self
    }

    /// Load a controller over the fixture's store.
    pub async fn controller(&self) -> keyward::Result<SettingsController<S>> {
        let notifier: Arc<dyn NotificationPermission> = self.notifier.clone();
        SettingsController::load(Arc::clone(&self.store), notifier, self.config.clone()).await
    }
}
