//! Driving port for sending messages.

use async_trait::async_trait;

use crate::domain::{ApplicationId, Error, Message, UserId};

/// Request to append a message to an application's transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendMessageRequest {
    /// Application the conversation belongs to.
    pub application_id: ApplicationId,
    /// Signed-in sender.
    pub sender_id: UserId,
    /// Receiver named by the client; must be the other party when present.
    pub receiver_id: Option<UserId>,
    /// Raw message body.
    pub content: String,
}

/// Driving port for the messaging gate.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageCommand: Send + Sync {
    /// Send a message on an accepted application.
    async fn send(&self, request: SendMessageRequest) -> Result<Message, Error>;
}
