//! Port for user notifications.

use async_trait::async_trait;

use crate::domain::{Notification, NotificationId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by notification repository adapters.
    pub enum NotificationRepositoryError for "notification repository" {}
}

/// Port for storing notifications and flipping their read flag.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Store a standalone notification.
    async fn insert(&self, notification: &Notification) -> Result<(), NotificationRepositoryError>;

    /// Fetch a notification by id.
    async fn find_by_id(
        &self,
        id: &NotificationId,
    ) -> Result<Option<Notification>, NotificationRepositoryError>;

    /// Set the read flag.
    ///
    /// Returns `true` only when the flag flipped from unread to read.
    async fn mark_read(&self, id: &NotificationId) -> Result<bool, NotificationRepositoryError>;

    /// Notifications addressed to `user`, newest first.
    async fn list_for_user(
        &self,
        user: &UserId,
    ) -> Result<Vec<Notification>, NotificationRepositoryError>;

    /// Number of unread notifications addressed to `user`.
    async fn unread_count(&self, user: &UserId) -> Result<u64, NotificationRepositoryError>;
}
