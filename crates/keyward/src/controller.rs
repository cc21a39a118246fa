//! The settings controller.
//!
//! Loads every settings domain from storage, routes edits to the component
//! that owns them, and writes staged edits back only when [`save`] is called.
//! Encrypting, decrypting, and revoking are the exceptions: they write
//! immediately.
//!
//! [`save`]: SettingsController::save

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use keyward_core::{EncryptionParams, KeyError, KeyInput, KeySecurity};
use keyward_perms::{Decision, PermissionGrant, PermissionStore, PermsError};
use keyward_store::{StorageKey, Store, StoreError, StoreExt};
use serde_json::Value;

use crate::error::{Result, SettingsError};
use crate::handler::ProtocolHandlerConfig;
use crate::manager::KeyEncryptionManager;
use crate::notice::{Notice, NoticeBoard};
use crate::notify::{NotificationPermission, NOTIFICATIONS_CAPABILITY};
use crate::relays::{RelayAccess, RelayEntry, RelayList};
use crate::staging::{ChangeSet, CommitReport, Domain, DomainPersister};

/// Default link handler template.
pub const DEFAULT_PROTOCOL_HANDLER: &str = "https://njump.me/{raw}";

/// Configuration for the controller.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// How long a notice stays visible.
    pub notice_ttl: Duration,
    /// Template installed when link handling is switched on with no template.
    pub default_protocol_handler: String,
    /// Initial encryption parameters.
    pub default_params: EncryptionParams,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            notice_ttl: Duration::from_secs(3),
            default_protocol_handler: DEFAULT_PROTOCOL_HANDLER.to_string(),
            default_params: EncryptionParams::default(),
        }
    }
}

/// Owns all settings state for one session.
///
/// Methods that change state take `&mut self`, so at most one transition is
/// in flight at a time.
pub struct SettingsController<S: Store> {
    store: Arc<S>,
    notifier: Arc<dyn NotificationPermission>,
    config: ControllerConfig,
    keys: KeyEncryptionManager<S>,
    relays: RelayList,
    protocol_handler: ProtocolHandlerConfig,
    notifications: bool,
    permissions: PermissionStore<S>,
    grants: Vec<PermissionGrant>,
    changes: ChangeSet,
    notices: NoticeBoard,
}

impl<S: Store> SettingsController<S> {
    /// Read every domain and the permission list from storage.
    pub async fn load(
        store: Arc<S>,
        notifier: Arc<dyn NotificationPermission>,
        config: ControllerConfig,
    ) -> Result<Self> {
        let keys = [
            StorageKey::PrivateKey.as_str(),
            StorageKey::Relays.as_str(),
            StorageKey::ProtocolHandler.as_str(),
            StorageKey::Notifications.as_str(),
        ];
        let values = store.get_many(&keys).await?;

        let mut manager = KeyEncryptionManager::new(Arc::clone(&store), config.default_params);
        let stored_key = values.get(StorageKey::PrivateKey.as_str());
        if stored_key.is_some_and(|v| !v.is_string()) {
            tracing::warn!("stored private key is not a string, ignoring");
        }
        manager.hydrate(stored_key.and_then(Value::as_str));

        let relays = values
            .get(StorageKey::Relays.as_str())
            .map(RelayList::from_stored)
            .unwrap_or_default();

        let protocol_handler = ProtocolHandlerConfig::from_stored(
            values
                .get(StorageKey::ProtocolHandler.as_str())
                .and_then(Value::as_str),
            &config.default_protocol_handler,
        );

        let notifications = values
            .get(StorageKey::Notifications.as_str())
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let permissions = PermissionStore::new(Arc::clone(&store));
        let grants = match permissions.load().await {
            Ok(grants) => grants,
            Err(PermsError::Store(StoreError::InvalidData { reason, .. })) => {
                tracing::warn!(%reason, "stored policies are malformed, showing none");
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(
            relays = relays.len(),
            handler_enabled = protocol_handler.enabled(),
            notifications,
            grants = grants.len(),
            "loaded settings"
        );

        let notices = NoticeBoard::new(config.notice_ttl);
        Ok(Self {
            store,
            notifier,
            config,
            keys: manager,
            relays,
            protocol_handler,
            notifications,
            permissions,
            grants,
            changes: ChangeSet::new(),
            notices,
        })
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The controller configuration.
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Private key
    // ─────────────────────────────────────────────────────────────────────────

    /// The key manager, for reading the key field and buffers.
    pub fn keys(&self) -> &KeyEncryptionManager<S> {
        &self.keys
    }

    /// The key field.
    pub fn key_input(&self) -> &KeyInput {
        self.keys.input()
    }

    /// Replace the key field with user-typed text.
    pub fn set_key_input(&mut self, text: &str) -> &KeyInput {
        self.changes.mark_dirty(Domain::PrivateKey);
        self.keys.set_input(text)
    }

    /// Replace the key field with a freshly generated key.
    pub fn generate_key(&mut self) -> &KeyInput {
        self.changes.mark_dirty(Domain::PrivateKey);
        self.keys.generate()
    }

    /// Set the encryption password buffer.
    pub fn set_password(&mut self, password: &str) {
        self.keys.set_password(password);
    }

    /// Set the confirmation buffer. Encryption needs it to match.
    pub fn set_confirm_password(&mut self, password: &str) {
        self.keys.set_confirm_password(password);
    }

    /// Set the password used by [`decrypt_key`](Self::decrypt_key).
    pub fn set_decrypt_password(&mut self, password: &str) {
        self.keys.set_decrypt_password(password);
    }

    /// Set the scrypt cost exponent for the next encryption.
    pub fn set_log_n(&mut self, log_n: u8) -> Result<()> {
        self.keys.set_log_n(log_n)
    }

    /// Set the key security byte for the next encryption.
    pub fn set_security(&mut self, security: KeySecurity) {
        self.keys.set_security(security);
    }

    /// Encrypt the current key and store the blob.
    pub async fn encrypt_key(&mut self) -> Result<()> {
        let result = self.keys.encrypt().await;
        match &result {
            Ok(()) => self.notices.post(Notice::success("encryption successful!")),
            Err(SettingsError::PasswordMismatch) => {
                self.notices.post(Notice::error("passwords do not match."))
            }
            Err(SettingsError::Key(KeyError::Validation(_))) => {
                self.notices.post(Notice::error("private key is invalid."))
            }
            Err(e) => {
                tracing::warn!(error = %e, "encryption failed");
                self.notices
                    .post(Notice::error("something went wrong. please try again."))
            }
        }
        result
    }

    /// Decrypt the current key and store it as hex.
    pub async fn decrypt_key(&mut self) -> Result<()> {
        let result = self.keys.decrypt().await;
        match &result {
            Ok(()) => self.notices.post(Notice::success("decryption successful!")),
            Err(SettingsError::Key(KeyError::WrongPassword)) => {
                self.notices
                    .post(Notice::error("incorrect password. please try again."))
            }
            Err(e) => {
                tracing::warn!(error = %e, "decryption failed");
                self.notices
                    .post(Notice::error("something went wrong. please try again."))
            }
        }
        result
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Relays
    // ─────────────────────────────────────────────────────────────────────────

    /// The relay list in display order.
    pub fn relays(&self) -> &[RelayEntry] {
        self.relays.entries()
    }

    /// Append a relay. Blank URLs are ignored and leave nothing dirty.
    pub fn add_relay(&mut self, url: &str) -> bool {
        self.mark_if(Domain::Relays, |c| c.relays.add(url))
    }

    /// Replace the URL at `index`. Out of range is a no-op.
    pub fn set_relay_url(&mut self, index: usize, url: &str) -> bool {
        self.mark_if(Domain::Relays, |c| c.relays.set_url(index, url))
    }

    /// Flip read or write access for the relay at `index`.
    pub fn toggle_relay(&mut self, index: usize, access: RelayAccess) -> bool {
        self.mark_if(Domain::Relays, |c| c.relays.toggle(index, access))
    }

    /// Remove the relay at `index`.
    pub fn remove_relay(&mut self, index: usize) -> bool {
        self.mark_if(Domain::Relays, |c| c.relays.remove(index))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Protocol handler
    // ─────────────────────────────────────────────────────────────────────────

    /// The link handler configuration.
    pub fn protocol_handler(&self) -> &ProtocolHandlerConfig {
        &self.protocol_handler
    }

    /// Replace the link handler template.
    pub fn set_protocol_handler_template(&mut self, template: &str) {
        self.protocol_handler.set_template(template);
        self.changes.mark_dirty(Domain::ProtocolHandler);
    }

    /// Switch link handling on or off.
    pub fn set_protocol_handler_enabled(&mut self, enabled: bool) {
        self.protocol_handler
            .set_enabled(enabled, &self.config.default_protocol_handler);
        self.changes.mark_dirty(Domain::ProtocolHandler);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Notifications
    // ─────────────────────────────────────────────────────────────────────────

    /// Whether notifications are on.
    pub fn notifications(&self) -> bool {
        self.notifications
    }

    /// Flip the notifications flag and return the new value.
    ///
    /// Switching on asks for permission first; a denial leaves the flag off.
    pub async fn toggle_notifications(&mut self) -> bool {
        self.notifications = !self.notifications;
        self.changes.mark_dirty(Domain::Notifications);
        if self.notifications && !self.notifier.request(NOTIFICATIONS_CAPABILITY).await {
            tracing::warn!("notification permission denied");
            self.notifications = false;
        }
        self.notifications
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Permissions
    // ─────────────────────────────────────────────────────────────────────────

    /// The permission list as of the last load or revoke.
    pub fn permissions(&self) -> &[PermissionGrant] {
        &self.grants
    }

    /// Re-read the permission list from storage.
    pub async fn reload_permissions(&mut self) -> Result<&[PermissionGrant]> {
        self.grants = self.permissions.load().await?;
        Ok(&self.grants)
    }

    /// Revoke one grant and refresh the list.
    pub async fn revoke_permission(
        &mut self,
        origin: &str,
        decision: Decision,
        operation_type: &str,
    ) -> Result<&[PermissionGrant]> {
        match self.permissions.revoke(origin, decision, operation_type).await {
            Ok(grants) => {
                self.grants = grants;
                self.notices.post(Notice::success("removed policies"));
                Ok(&self.grants)
            }
            Err(e) => {
                self.notices
                    .post(Notice::error(format!("failed to remove policies: {e}")));
                Err(e.into())
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Staging
    // ─────────────────────────────────────────────────────────────────────────

    /// Domains with unsaved edits.
    pub fn changes(&self) -> &ChangeSet {
        &self.changes
    }

    /// True when any domain has unsaved edits.
    pub fn has_unsaved_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    /// Write every dirty domain and clear the change set.
    ///
    /// A failed domain does not stop the others. The report lists each
    /// outcome and a notice summarises them.
    pub async fn save(&mut self) -> CommitReport {
        let changes = std::mem::take(&mut self.changes);
        let mut persister = Persister {
            store: self.store.as_ref(),
            keys: &mut self.keys,
            relays: &self.relays,
            protocol_handler: &self.protocol_handler,
            notifications: self.notifications,
        };
        let report = changes.commit(&mut persister).await;
        self.notices.post(summarise(&report));
        report
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Notices
    // ─────────────────────────────────────────────────────────────────────────

    /// The notice currently shown, if any.
    pub fn notice(&self) -> Option<Notice> {
        self.notices.current()
    }

    fn mark_if(&mut self, domain: Domain, edit: impl FnOnce(&mut Self) -> bool) -> bool {
        let changed = edit(self);
        if changed {
            self.changes.mark_dirty(domain);
        }
        changed
    }
}

/// Writes domains from borrowed controller state.
struct Persister<'a, S: Store> {
    store: &'a S,
    keys: &'a mut KeyEncryptionManager<S>,
    relays: &'a RelayList,
    protocol_handler: &'a ProtocolHandlerConfig,
    notifications: bool,
}

#[async_trait]
impl<'a, S: Store> DomainPersister for Persister<'a, S> {
    async fn persist(&mut self, domain: Domain) -> Result<()> {
        let key = domain.storage_key();
        match domain {
            Domain::PrivateKey => self.keys.save().await?,
            Domain::Relays => {
                self.store
                    .set_typed(key.as_str(), &self.relays.to_stored())
                    .await?
            }
            Domain::ProtocolHandler => {
                let template = self.protocol_handler.to_stored().to_string();
                self.store.set(key.as_str(), Value::String(template)).await?
            }
            Domain::Notifications => {
                self.store
                    .set(key.as_str(), Value::Bool(self.notifications))
                    .await?
            }
        }
        Ok(())
    }
}

fn summarise(report: &CommitReport) -> Notice {
    if report.is_empty() {
        return Notice::info("nothing to save");
    }
    let failed = report.failed();
    if failed.is_empty() {
        let saved: Vec<&str> = report.succeeded().into_iter().map(Domain::label).collect();
        return Notice::success(format!("saved {}!", saved.join(", ")));
    }
    let reasons: Vec<String> = failed
        .iter()
        .map(|(domain, e)| match e {
            SettingsError::Key(KeyError::Validation(_)) => {
                "private key is invalid, did not save private key".to_string()
            }
            e => format!("failed to save {}: {e}", domain.label()),
        })
        .collect();
    Notice::error(reasons.join("; "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::FixedPermission;
    use keyward_store::MemoryStore;
    use serde_json::json;

    const HEX: &str = "67dea2ed018072d675f5415ecfaed7d2597555e202d85b3d65ea4e58d2d92ffa";
    const NSEC: &str = "nsec1vl029mgpspedva04g90vltkh6fvh240zqtv9k0t9af8935ke9laqsnlfe5";

    async fn controller(
        store: Arc<MemoryStore>,
        grant: bool,
    ) -> SettingsController<MemoryStore> {
        SettingsController::load(store, Arc::new(FixedPermission(grant)), ControllerConfig::default())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_load_hydrates_all_domains() {
        let store = Arc::new(MemoryStore::with_values([
            ("private_key", json!(HEX)),
            ("relays", json!({"wss://a.example": {"read": true, "write": false}})),
            ("protocol_handler", json!("https://x/{hex}")),
            ("notifications", json!(true)),
            (
                "policies",
                json!({"https://o.example": {"false": {"signEvent": {"conditions": {}, "created_at": 5}}}}),
            ),
        ]));
        let c = controller(store, true).await;

        assert_eq!(c.key_input().text(), NSEC);
        assert_eq!(c.relays().len(), 1);
        assert!(c.protocol_handler().enabled());
        assert!(c.notifications());
        assert_eq!(c.permissions().len(), 1);
        assert_eq!(c.permissions()[0].decision, Decision::Deny);
        assert!(!c.has_unsaved_changes());
    }

    #[tokio::test]
    async fn test_load_empty_store() {
        let c = controller(Arc::new(MemoryStore::new()), true).await;
        assert!(c.key_input().is_empty());
        assert!(c.relays().is_empty());
        assert!(!c.protocol_handler().enabled());
        assert_eq!(c.protocol_handler().template(), DEFAULT_PROTOCOL_HANDLER);
        assert!(!c.notifications());
    }

    #[tokio::test]
    async fn test_edits_stage_until_save() {
        let store = Arc::new(MemoryStore::new());
        let mut c = controller(store.clone(), true).await;

        c.add_relay("wss://a.example");
        c.set_key_input(HEX);
        assert!(store.get("relays").await.unwrap().is_none());
        assert_eq!(
            c.changes().iter().collect::<Vec<_>>(),
            vec![Domain::Relays, Domain::PrivateKey]
        );

        let report = c.save().await;
        assert!(report.is_success());
        assert!(!c.has_unsaved_changes());
        assert_eq!(store.get("private_key").await.unwrap(), Some(json!(HEX)));
        assert_eq!(
            store.get("relays").await.unwrap(),
            Some(json!({"wss://a.example": {"read": true, "write": true}}))
        );
        assert_eq!(c.key_input().text(), NSEC);
    }

    #[tokio::test]
    async fn test_blank_relay_not_dirty() {
        let mut c = controller(Arc::new(MemoryStore::new()), true).await;
        assert!(!c.add_relay("  "));
        assert!(!c.remove_relay(0));
        assert!(!c.has_unsaved_changes());
    }

    #[tokio::test]
    async fn test_notifications_denied_reverts() {
        let store = Arc::new(MemoryStore::new());
        let mut c = controller(store.clone(), false).await;
        assert!(!c.toggle_notifications().await);
        assert!(c.changes().is_dirty(Domain::Notifications));

        c.save().await;
        assert_eq!(store.get("notifications").await.unwrap(), Some(json!(false)));
    }

    #[tokio::test]
    async fn test_invalid_key_save_reports_validation() {
        let store = Arc::new(MemoryStore::new());
        let mut c = controller(store.clone(), true).await;
        c.set_key_input("not-a-key");
        c.toggle_notifications().await;

        let report = c.save().await;
        assert_eq!(report.succeeded(), vec![Domain::Notifications]);
        assert!(store.get("private_key").await.unwrap().is_none());
        let notice = c.notice().unwrap();
        assert_eq!(notice.level, crate::notice::NoticeLevel::Error);
        assert!(notice.text.contains("private key is invalid"));
    }

    #[tokio::test]
    async fn test_encrypt_invalid_key_reports_validation() {
        let store = Arc::new(MemoryStore::new());
        let mut c = controller(store.clone(), true).await;
        c.set_key_input("not-a-key");
        c.set_password("pw");
        c.set_confirm_password("pw");

        assert!(matches!(
            c.encrypt_key().await,
            Err(SettingsError::Key(KeyError::Validation(_)))
        ));
        assert!(store.get("private_key").await.unwrap().is_none());
        let notice = c.notice().unwrap();
        assert_eq!(notice.level, crate::notice::NoticeLevel::Error);
        assert_eq!(notice.text, "private key is invalid.");
    }

    #[tokio::test]
    async fn test_handler_disable_persists_empty() {
        let store = Arc::new(MemoryStore::with_values([(
            "protocol_handler",
            json!("https://x/{raw}"),
        )]));
        let mut c = controller(store.clone(), true).await;
        c.set_protocol_handler_enabled(false);
        c.save().await;
        assert_eq!(store.get("protocol_handler").await.unwrap(), Some(json!("")));
    }

    #[tokio::test]
    async fn test_revoke_refreshes_list() {
        let store = Arc::new(MemoryStore::with_values([(
            "policies",
            json!({"https://o.example": {"true": {
                "signEvent": {"conditions": {}, "created_at": 1},
                "nip04.encrypt": {"conditions": {}, "created_at": 2}
            }}}),
        )]));
        let mut c = controller(store, true).await;
        let left = c
            .revoke_permission("https://o.example", Decision::Allow, "signEvent")
            .await
            .unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(c.notice(), Some(Notice::success("removed policies")));
    }

    #[tokio::test]
    async fn test_malformed_policies_show_none() {
        let store = Arc::new(MemoryStore::with_values([("policies", json!(42))]));
        let c = controller(store, true).await;
        assert!(c.permissions().is_empty());
    }
}
