//! Port for application transcripts.

use async_trait::async_trait;

use crate::domain::{ApplicationId, Message, Notification};

use super::define_port_error;

define_port_error! {
    /// Errors raised by message repository adapters.
    pub enum MessageRepositoryError for "message repository" {}
}

/// Port for the append-only message log.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Append `message` and store the receiver's notification atomically.
    async fn append_with_notification(
        &self,
        message: &Message,
        notification: &Notification,
    ) -> Result<(), MessageRepositoryError>;

    /// Transcript for an application ordered by creation time, then by the
    /// order messages were appended.
    async fn list_for_application(
        &self,
        application: &ApplicationId,
    ) -> Result<Vec<Message>, MessageRepositoryError>;
}
