//! Notification channel trait.

use crate::error::NotifyError;
use crate::types::Notification;
use async_trait::async_trait;

/// A best-effort outbound channel (email, chat webhook, ...).
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one notification.
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;

    /// Channel name for logs.
    fn name(&self) -> &str;
}
