//! Driving port for notification mutations.

use async_trait::async_trait;

use crate::domain::{Error, Notification, NotificationDraft, NotificationId, UserId};

/// Driving port for creating notifications and acknowledging them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationCommand: Send + Sync {
    /// Store a notification for a recipient chosen by the system.
    ///
    /// This is the entry point for server-side producers such as jobs or
    /// other services. No HTTP route reaches it; notifications raised by
    /// applications and messages are written by their own repositories
    /// inside the same transaction.
    async fn create(&self, draft: NotificationDraft) -> Result<Notification, Error>;

    /// Mark a notification read. Repeating the call is harmless.
    async fn mark_read(&self, id: &NotificationId, caller: &UserId) -> Result<Notification, Error>;
}
