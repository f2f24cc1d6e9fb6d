//! Change events published after every committed mutation.
//!
//! Subscribers re-fetch the named entity rather than receiving a diff.
//! Events for one entity are published from the request that wrote it, after
//! the write commits, so per-entity order follows write order.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Application, Message, Notification, Pet, UserId};

/// Kind of entity that changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A user profile.
    User,
    /// A pet listing.
    Pet,
    /// An adoption application.
    Application,
    /// A transcript message.
    Message,
    /// A notification.
    Notification,
}

/// What happened to the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// The entity was written for the first time.
    Created,
    /// The entity was modified.
    Updated,
    /// The entity was soft-removed.
    Removed,
}

/// Who should hear about a change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Audience {
    /// Every connected subscriber, e.g. for public listings.
    Everyone,
    /// Only the named users.
    Users(Vec<UserId>),
}

impl Audience {
    /// True when `user` should receive the event.
    pub fn includes(&self, user: &UserId) -> bool {
        match self {
            Self::Everyone => true,
            Self::Users(users) => users.contains(user),
        }
    }
}

/// A single change notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    /// Entity kind.
    pub entity: EntityKind,
    /// Entity identifier.
    pub id: Uuid,
    /// What happened.
    pub change: ChangeKind,
    /// Recipients.
    #[serde(skip)]
    pub audience: Audience,
}

impl ChangeEvent {
    /// A listing changed; listings are public.
    pub fn pet(pet: &Pet, change: ChangeKind) -> Self {
        Self {
            entity: EntityKind::Pet,
            id: *pet.id.as_uuid(),
            change,
            audience: Audience::Everyone,
        }
    }

    /// An application changed; both parties hear about it.
    pub fn application(application: &Application, change: ChangeKind) -> Self {
        Self {
            entity: EntityKind::Application,
            id: *application.id.as_uuid(),
            change,
            audience: Audience::Users(vec![application.applicant_id, application.owner_id]),
        }
    }

    /// A message was appended; both parties hear about it.
    pub fn message(message: &Message) -> Self {
        Self {
            entity: EntityKind::Message,
            id: *message.id.as_uuid(),
            change: ChangeKind::Created,
            audience: Audience::Users(vec![message.sender_id, message.receiver_id]),
        }
    }

    /// A notification changed; only its recipient hears about it.
    pub fn notification(notification: &Notification, change: ChangeKind) -> Self {
        Self {
            entity: EntityKind::Notification,
            id: *notification.id.as_uuid(),
            change,
            audience: Audience::Users(vec![notification.user_id]),
        }
    }

    /// A profile changed; only its owner hears about it.
    pub fn user(user: &UserId, change: ChangeKind) -> Self {
        Self {
            entity: EntityKind::User,
            id: *user.as_uuid(),
            change,
            audience: Audience::Users(vec![*user]),
        }
    }
}
