//! The notification permission prompt.

use async_trait::async_trait;

/// The capability requested when notifications are switched on.
pub const NOTIFICATIONS_CAPABILITY: &str = "notifications";

/// Asks the host whether a capability may be used.
#[async_trait]
pub trait NotificationPermission: Send + Sync {
    /// Prompt for `capability`. Returns whether it was granted.
    async fn request(&self, capability: &str) -> bool;
}

/// Grants or denies every request without prompting.
#[derive(Debug, Clone, Copy)]
pub struct FixedPermission(pub bool);

#[async_trait]
impl NotificationPermission for FixedPermission {
    async fn request(&self, capability: &str) -> bool {
        tracing::debug!(%capability, granted = self.0, "notification permission requested");
        self.0
    }
}
