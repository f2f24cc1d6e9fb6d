//! Messages exchanged on an accepted application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::validation::{ValidationError, required_text};
use super::{ApplicationId, MessageId, UserId};

/// Maximum message length in characters.
pub const MESSAGE_MAX_CHARS: usize = 2000;

/// Validated message text: trimmed, non-blank, at most
/// [`MESSAGE_MAX_CHARS`] characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContent(String);

impl MessageContent {
    /// Validate raw message text.
    ///
    /// # Examples
    /// ```
    /// use adoption_backend::domain::MessageContent;
    ///
    /// assert!(MessageContent::new("  Hello ").is_ok());
    /// assert!(MessageContent::new("   ").is_err());
    /// ```
    pub fn new(raw: &str) -> Result<Self, ValidationError> {
        required_text("content", raw, MESSAGE_MAX_CHARS).map(Self)
    }
}

impl AsRef<str> for MessageContent {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<MessageContent> for String {
    fn from(value: MessageContent) -> Self {
        value.0
    }
}

/// A message in an application transcript. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Message identifier.
    #[schema(value_type = String, format = Uuid)]
    pub id: MessageId,
    /// Application the transcript belongs to.
    #[schema(value_type = String, format = Uuid)]
    pub application_id: ApplicationId,
    /// Author.
    #[schema(value_type = String, format = Uuid)]
    pub sender_id: UserId,
    /// The other party.
    #[schema(value_type = String, format = Uuid)]
    pub receiver_id: UserId,
    /// Message text.
    pub content: String,
    /// Write time.
    pub created_at: DateTime<Utc>,
}
