//! Driving port for notification feeds.

use async_trait::async_trait;

use crate::domain::{Error, Notification, UserId};

/// Driving port for reading a user's notifications.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationQuery: Send + Sync {
    /// Notifications for `user`, newest first.
    async fn list(&self, user: &UserId) -> Result<Vec<Notification>, Error>;

    /// Count of unread notifications for `user`.
    async fn unread_count(&self, user: &UserId) -> Result<u64, Error>;
}
