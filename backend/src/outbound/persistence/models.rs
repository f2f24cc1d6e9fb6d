//! Internal Diesel row structs and their domain conversions.
//!
//! Rows never leave the persistence layer. Reads go through `TryFrom` so a
//! stored value the domain no longer accepts surfaces as a [`CorruptRow`]
//! instead of a panic.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    AdopterPreferences, Application, ApplicationId, Message, MessageId, Notification,
    NotificationId, Pet, PetId, Questionnaire, SubjectId, User, UserId,
};

use super::schema::{applications, messages, notifications, pets, users};

/// A stored row could not be turned back into a domain value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("stored {table} row {id} is invalid: {reason}")]
pub(crate) struct CorruptRow {
    table: &'static str,
    id: Uuid,
    reason: String,
}

impl CorruptRow {
    fn new(table: &'static str, id: Uuid, reason: impl ToString) -> Self {
        Self {
            table,
            id,
            reason: reason.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub subject: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub preferences: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Profile columns written by a profile update.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ProfileChangeset<'a> {
    pub name: &'a str,
    pub phone: Option<&'a str>,
    pub location: Option<&'a str>,
    pub bio: Option<&'a str>,
    pub preferences: serde_json::Value,
}

impl UserRow {
    pub(crate) fn from_domain(user: &User) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: *user.id.as_uuid(),
            subject: user.subject.as_ref().to_owned(),
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            location: user.location.clone(),
            bio: user.bio.clone(),
            preferences: serde_json::to_value(&user.preferences)?,
            created_at: user.created_at,
            deleted_at: None,
        })
    }
}

impl<'a> ProfileChangeset<'a> {
    pub(crate) fn from_domain(user: &'a User) -> Result<Self, serde_json::Error> {
        Ok(Self {
            name: &user.name,
            phone: user.phone.as_deref(),
            location: user.location.as_deref(),
            bio: user.bio.as_deref(),
            preferences: serde_json::to_value(&user.preferences)?,
        })
    }
}

impl TryFrom<UserRow> for User {
    type Error = CorruptRow;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let corrupt = |reason: &dyn ToString| CorruptRow::new("users", id, reason.to_string());
        let subject = SubjectId::new(&row.subject).map_err(|err| corrupt(&err))?;
        let preferences: AdopterPreferences =
            serde_json::from_value(row.preferences).map_err(|err| corrupt(&err))?;
        Ok(Self {
            id: UserId::from_uuid(row.id),
            subject,
            name: row.name,
            email: row.email,
            phone: row.phone,
            location: row.location,
            bio: row.bio,
            preferences,
            created_at: row.created_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Pets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = pets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PetRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub species: String,
    pub breed: String,
    pub size: String,
    pub age_years: i16,
    pub gender: String,
    pub description: String,
    pub images: Vec<String>,
    pub activity_level: String,
    pub good_with_kids: bool,
    pub good_with_pets: bool,
    pub house_trained: bool,
    pub medical_info: Option<String>,
    pub adoption_fee_cents: Option<i64>,
    pub location: String,
    pub is_available: bool,
    pub is_removed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Mutable listing columns. `owner_id` and `created_at` are never rewritten.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = pets)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct PetChangeset<'a> {
    pub name: &'a str,
    pub species: &'a str,
    pub breed: &'a str,
    pub size: &'a str,
    pub age_years: i16,
    pub gender: &'a str,
    pub description: &'a str,
    pub images: &'a [String],
    pub activity_level: &'a str,
    pub good_with_kids: bool,
    pub good_with_pets: bool,
    pub house_trained: bool,
    pub medical_info: Option<&'a str>,
    pub adoption_fee_cents: Option<i64>,
    pub location: &'a str,
    pub is_available: bool,
    pub updated_at: DateTime<Utc>,
}

fn age_column(pet: &Pet) -> i16 {
    i16::try_from(pet.age_years).unwrap_or(i16::MAX)
}

impl PetRow {
    pub(crate) fn from_domain(pet: &Pet) -> Self {
        Self {
            id: *pet.id.as_uuid(),
            owner_id: *pet.owner_id.as_uuid(),
            name: pet.name.clone(),
            species: pet.species.as_str().to_owned(),
            breed: pet.breed.clone(),
            size: pet.size.as_str().to_owned(),
            age_years: age_column(pet),
            gender: pet.gender.as_str().to_owned(),
            description: pet.description.clone(),
            images: pet.images.clone(),
            activity_level: pet.activity_level.as_str().to_owned(),
            good_with_kids: pet.good_with_kids,
            good_with_pets: pet.good_with_pets,
            house_trained: pet.house_trained,
            medical_info: pet.medical_info.clone(),
            adoption_fee_cents: pet.adoption_fee_cents,
            location: pet.location.clone(),
            is_available: pet.is_available,
            is_removed: pet.is_removed,
            created_at: pet.created_at,
            updated_at: pet.updated_at,
        }
    }
}

impl<'a> PetChangeset<'a> {
    pub(crate) fn from_domain(pet: &'a Pet) -> Self {
        Self {
            name: &pet.name,
            species: pet.species.as_str(),
            breed: &pet.breed,
            size: pet.size.as_str(),
            age_years: age_column(pet),
            gender: pet.gender.as_str(),
            description: &pet.description,
            images: &pet.images,
            activity_level: pet.activity_level.as_str(),
            good_with_kids: pet.good_with_kids,
            good_with_pets: pet.good_with_pets,
            house_trained: pet.house_trained,
            medical_info: pet.medical_info.as_deref(),
            adoption_fee_cents: pet.adoption_fee_cents,
            location: &pet.location,
            is_available: pet.is_available,
            updated_at: pet.updated_at,
        }
    }
}

impl TryFrom<PetRow> for Pet {
    type Error = CorruptRow;

    fn try_from(row: PetRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let corrupt = |reason: &dyn ToString| CorruptRow::new("pets", id, reason.to_string());
        Ok(Self {
            id: PetId::from_uuid(row.id),
            owner_id: UserId::from_uuid(row.owner_id),
            name: row.name,
            species: row.species.parse().map_err(|err| corrupt(&err))?,
            breed: row.breed,
            size: row.size.parse().map_err(|err| corrupt(&err))?,
            age_years: u16::try_from(row.age_years).map_err(|err| corrupt(&err))?,
            gender: row.gender.parse().map_err(|err| corrupt(&err))?,
            description: row.description,
            images: row.images,
            activity_level: row.activity_level.parse().map_err(|err| corrupt(&err))?,
            good_with_kids: row.good_with_kids,
            good_with_pets: row.good_with_pets,
            house_trained: row.house_trained,
            medical_info: row.medical_info,
            adoption_fee_cents: row.adoption_fee_cents,
            location: row.location,
            is_available: row.is_available,
            is_removed: row.is_removed,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Applications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = applications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ApplicationRow {
    pub id: Uuid,
    pub pet_id: Uuid,
    pub applicant_id: Uuid,
    pub owner_id: Uuid,
    pub questionnaire: serde_json::Value,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
}

impl ApplicationRow {
    pub(crate) fn from_domain(application: &Application) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: *application.id.as_uuid(),
            pet_id: *application.pet_id.as_uuid(),
            applicant_id: *application.applicant_id.as_uuid(),
            owner_id: *application.owner_id.as_uuid(),
            questionnaire: serde_json::to_value(&application.questionnaire)?,
            status: application.status.as_str().to_owned(),
            created_at: application.created_at,
            decided_at: application.decided_at,
        })
    }
}

impl TryFrom<ApplicationRow> for Application {
    type Error = CorruptRow;

    fn try_from(row: ApplicationRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let corrupt =
            |reason: &dyn ToString| CorruptRow::new("applications", id, reason.to_string());
        let questionnaire: Questionnaire =
            serde_json::from_value(row.questionnaire).map_err(|err| corrupt(&err))?;
        Ok(Self {
            id: ApplicationId::from_uuid(row.id),
            pet_id: PetId::from_uuid(row.pet_id),
            applicant_id: UserId::from_uuid(row.applicant_id),
            owner_id: UserId::from_uuid(row.owner_id),
            questionnaire,
            status: row.status.parse().map_err(|err| corrupt(&err))?,
            created_at: row.created_at,
            decided_at: row.decided_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MessageRow {
    pub id: Uuid,
    pub application_id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Message> for MessageRow {
    fn from(message: &Message) -> Self {
        Self {
            id: *message.id.as_uuid(),
            application_id: *message.application_id.as_uuid(),
            sender_id: *message.sender_id.as_uuid(),
            receiver_id: *message.receiver_id.as_uuid(),
            content: message.content.clone(),
            created_at: message.created_at,
        }
    }
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Self {
            id: MessageId::from_uuid(row.id),
            application_id: ApplicationId::from_uuid(row.application_id),
            sender_id: UserId::from_uuid(row.sender_id),
            receiver_id: UserId::from_uuid(row.receiver_id),
            content: row.content,
            created_at: row.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct NotificationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub title: String,
    pub body: String,
    pub related_id: Option<Uuid>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Notification> for NotificationRow {
    fn from(notification: &Notification) -> Self {
        Self {
            id: *notification.id.as_uuid(),
            user_id: *notification.user_id.as_uuid(),
            kind: notification.kind.as_str().to_owned(),
            title: notification.title.clone(),
            body: notification.body.clone(),
            related_id: notification.related_id,
            is_read: notification.is_read,
            created_at: notification.created_at,
        }
    }
}

impl TryFrom<NotificationRow> for Notification {
    type Error = CorruptRow;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        let kind = row
            .kind
            .parse()
            .map_err(|err| CorruptRow::new("notifications", row.id, err))?;
        Ok(Self {
            id: NotificationId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            kind,
            title: row.title,
            body: row.body,
            related_id: row.related_id,
            is_read: row.is_read,
            created_at: row.created_at,
        })
    }
}
