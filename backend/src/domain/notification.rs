//! System notifications emitted as side effects of applications and messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::validation::{ValidationError, required_text};
use super::{Application, Message, NotificationId, Pet, User, UserId};

const TITLE_MAX: usize = 200;
const BODY_MAX: usize = 2000;
const PREVIEW_CHARS: usize = 80;

/// Category tag of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A new application arrived for one of the user's pets.
    AdoptionRequest,
    /// The owner decided on the user's application.
    ApplicationUpdate,
    /// A new message arrived on an accepted application.
    Message,
}

impl NotificationKind {
    /// Stable string form used on the wire and in storage.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AdoptionRequest => "adoption_request",
            Self::ApplicationUpdate => "application_update",
            Self::Message => "message",
        }
    }
}

/// Error returned when parsing an unknown notification kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown notification kind: {input}")]
pub struct ParseNotificationKindError {
    /// The unrecognised input value.
    pub input: String,
}

impl std::str::FromStr for NotificationKind {
    type Err = ParseNotificationKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "adoption_request" => Ok(Self::AdoptionRequest),
            "application_update" => Ok(Self::ApplicationUpdate),
            "message" => Ok(Self::Message),
            _ => Err(ParseNotificationKindError {
                input: s.to_owned(),
            }),
        }
    }
}

/// A notification waiting to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationDraft {
    /// Recipient.
    pub user_id: UserId,
    /// Category.
    pub kind: NotificationKind,
    /// Short headline.
    pub title: String,
    /// Body text.
    pub body: String,
    /// Entity the notification points at.
    pub related_id: Option<Uuid>,
}

impl NotificationDraft {
    /// Validate a free-form draft.
    pub fn try_new(
        user_id: UserId,
        kind: NotificationKind,
        title: &str,
        body: &str,
        related_id: Option<Uuid>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            user_id,
            kind,
            title: required_text("title", title, TITLE_MAX)?,
            body: required_text("message", body, BODY_MAX)?,
            related_id,
        })
    }

    /// Tell the owner a new application arrived.
    pub fn adoption_request(application: &Application, pet: &Pet, applicant: &User) -> Self {
        Self {
            user_id: application.owner_id,
            kind: NotificationKind::AdoptionRequest,
            title: "New adoption request".to_owned(),
            body: format!("{} applied to adopt {}", applicant.name, pet.name),
            related_id: Some(*application.id.as_uuid()),
        }
    }

    /// Tell the applicant the owner decided.
    pub fn application_update(application: &Application, pet_name: &str) -> Self {
        let status = application.status;
        Self {
            user_id: application.applicant_id,
            kind: NotificationKind::ApplicationUpdate,
            title: format!("Application {status}"),
            body: format!("Your application for {pet_name} has been {status}"),
            related_id: Some(*application.id.as_uuid()),
        }
    }

    /// Tell the receiver a message arrived.
    pub fn new_message(message: &Message, sender_name: &str) -> Self {
        Self {
            user_id: message.receiver_id,
            kind: NotificationKind::Message,
            title: format!("New message from {sender_name}"),
            body: preview(&message.content),
            related_id: Some(*message.application_id.as_uuid()),
        }
    }
}

fn preview(content: &str) -> String {
    let mut chars = content.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}…")
    } else {
        head
    }
}

/// A stored notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Notification identifier.
    #[schema(value_type = String, format = Uuid)]
    pub id: NotificationId,
    /// Recipient.
    #[schema(value_type = String, format = Uuid)]
    pub user_id: UserId,
    /// Category.
    pub kind: NotificationKind,
    /// Short headline.
    pub title: String,
    /// Body text.
    pub body: String,
    /// Entity the notification points at.
    pub related_id: Option<Uuid>,
    /// Read flag; only ever flips from false to true.
    pub is_read: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Materialise a draft as an unread notification.
    pub fn from_draft(id: NotificationId, draft: NotificationDraft, now: DateTime<Utc>) -> Self {
        let NotificationDraft {
            user_id,
            kind,
            title,
            body,
            related_id,
        } = draft;
        Self {
            id,
            user_id,
            kind,
            title,
            body,
            related_id,
            is_read: false,
            created_at: now,
        }
    }

    /// Mark as read. Returns `true` when the flag actually changed.
    pub fn mark_read(&mut self) -> bool {
        let changed = !self.is_read;
        self.is_read = true;
        changed
    }
}

/// Ordering used for notification feeds: newest first, ties by id.
pub fn newest_first(a: &Notification, b: &Notification) -> std::cmp::Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.id.cmp(&a.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ApplicationId, ApplicationStatus, MessageId};
    use rstest::rstest;

    fn decided(status: ApplicationStatus) -> Application {
        Application {
            id: ApplicationId::random(),
            pet_id: crate::domain::PetId::random(),
            applicant_id: UserId::random(),
            owner_id: UserId::random(),
            questionnaire: crate::domain::Questionnaire::default(),
            status,
            created_at: Utc::now(),
            decided_at: Some(Utc::now()),
        }
    }

    #[rstest]
    #[case(ApplicationStatus::Accepted, "Application accepted", "Your application for Rex has been accepted")]
    #[case(ApplicationStatus::Rejected, "Application rejected", "Your application for Rex has been rejected")]
    fn application_update_targets_applicant(
        #[case] status: ApplicationStatus,
        #[case] title: &str,
        #[case] body: &str,
    ) {
        let application = decided(status);
        let draft = NotificationDraft::application_update(&application, "Rex");

        assert_eq!(draft.user_id, application.applicant_id);
        assert_eq!(draft.kind, NotificationKind::ApplicationUpdate);
        assert_eq!(draft.title, title);
        assert_eq!(draft.body, body);
        assert_eq!(draft.related_id, Some(*application.id.as_uuid()));
    }

    #[rstest]
    fn message_preview_is_truncated() {
        let message = Message {
            id: MessageId::random(),
            application_id: ApplicationId::random(),
            sender_id: UserId::random(),
            receiver_id: UserId::random(),
            content: "x".repeat(200),
            created_at: Utc::now(),
        };
        let draft = NotificationDraft::new_message(&message, "Ada");

        assert_eq!(draft.user_id, message.receiver_id);
        assert_eq!(draft.body.chars().count(), PREVIEW_CHARS + 1);
        assert!(draft.body.ends_with('…'));
    }

    #[rstest]
    fn mark_read_is_idempotent() {
        let draft = NotificationDraft::try_new(
            UserId::random(),
            NotificationKind::Message,
            "Hi",
            "Hello there",
            None,
        )
        .expect("valid draft");
        let mut notification = Notification::from_draft(NotificationId::random(), draft, Utc::now());

        assert!(notification.mark_read());
        assert!(!notification.mark_read());
        assert!(notification.is_read);
    }

    #[rstest]
    fn blank_titles_are_rejected() {
        let result = NotificationDraft::try_new(
            UserId::random(),
            NotificationKind::Message,
            " ",
            "body",
            None,
        );
        assert_eq!(result, Err(ValidationError::Blank { field: "title" }));
    }
}
