//! Notification services.
//!
//! Most notifications are written by other services in the same unit of work
//! as the change they describe; [`NotificationCommand::create`] covers the
//! standalone case.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;

use crate::domain::access::ensure_recipient;
use crate::domain::ports::{
    ChangePublisher, NotificationCommand, NotificationQuery, NotificationRepository,
};
use crate::domain::repository_errors::map_notification_error;
use crate::domain::{
    ChangeEvent, ChangeKind, Error, Notification, NotificationDraft, NotificationId, UserId,
};

/// Notification service implementing the notification driving ports.
#[derive(Clone)]
pub struct NotificationService<N> {
    notifications: Arc<N>,
    clock: Arc<dyn Clock>,
    changes: Arc<dyn ChangePublisher>,
}

impl<N> NotificationService<N> {
    /// Create a new service.
    pub fn new(
        notifications: Arc<N>,
        clock: Arc<dyn Clock>,
        changes: Arc<dyn ChangePublisher>,
    ) -> Self {
        Self {
            notifications,
            clock,
            changes,
        }
    }
}

#[async_trait]
impl<N: NotificationRepository> NotificationCommand for NotificationService<N> {
    async fn create(&self, draft: NotificationDraft) -> Result<Notification, Error> {
        let notification = Notification::from_draft(NotificationId::random(), draft, self.clock.utc());
        self.notifications
            .insert(&notification)
            .await
            .map_err(map_notification_error)?;
        self.changes
            .publish(ChangeEvent::notification(&notification, ChangeKind::Created));
        Ok(notification)
    }

    async fn mark_read(&self, id: &NotificationId, caller: &UserId) -> Result<Notification, Error> {
        let mut notification = self
            .notifications
            .find_by_id(id)
            .await
            .map_err(map_notification_error)?
            .ok_or_else(|| Error::not_found(format!("notification {id} not found")))?;
        ensure_recipient(&notification, caller)?;
        if notification.is_read {
            return Ok(notification);
        }

        let flipped = self
            .notifications
            .mark_read(id)
            .await
            .map_err(map_notification_error)?;
        notification.mark_read();
        if flipped {
            self.changes
                .publish(ChangeEvent::notification(&notification, ChangeKind::Updated));
        }
        Ok(notification)
    }
}

#[async_trait]
impl<N: NotificationRepository> NotificationQuery for NotificationService<N> {
    async fn list(&self, user: &UserId) -> Result<Vec<Notification>, Error> {
        self.notifications
            .list_for_user(user)
            .await
            .map_err(map_notification_error)
    }

    async fn unread_count(&self, user: &UserId) -> Result<u64, Error> {
        self.notifications
            .unread_count(user)
            .await
            .map_err(map_notification_error)
    }
}
