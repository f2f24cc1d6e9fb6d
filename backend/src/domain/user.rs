//! User accounts synchronised from the identity provider.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::validation::{ValidationError, optional_text, required_text};
use super::{AdopterPreferences, UserId};

const NAME_MAX: usize = 100;
const EMAIL_MAX: usize = 254;
const SUBJECT_MAX: usize = 255;
const PHONE_MAX: usize = 32;
const LOCATION_MAX: usize = 120;
const BIO_MAX: usize = 1000;

/// Subject identifier vouched for by the upstream identity provider.
///
/// Unique per user; the service never issues these itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SubjectId(String);

impl SubjectId {
    /// Validate and construct a subject identifier.
    pub fn new(subject: impl AsRef<str>) -> Result<Self, ValidationError> {
        let raw = subject.as_ref();
        if raw.trim() != raw {
            return Err(ValidationError::Invalid {
                field: "subject",
                reason: "must not contain surrounding whitespace".to_owned(),
            });
        }
        required_text("subject", raw, SUBJECT_MAX).map(Self)
    }
}

impl AsRef<str> for SubjectId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<SubjectId> for String {
    fn from(value: SubjectId) -> Self {
        value.0
    }
}

impl TryFrom<String> for SubjectId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Stable identifier.
    #[schema(value_type = String, format = Uuid)]
    pub id: UserId,
    /// Identity-provider subject.
    #[schema(value_type = String, example = "user_2abc")]
    pub subject: SubjectId,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Contact phone number.
    pub phone: Option<String>,
    /// Free-text location.
    pub location: Option<String>,
    /// Short biography.
    pub bio: Option<String>,
    /// Stored preference set.
    pub preferences: AdopterPreferences,
    /// Account creation time.
    pub created_at: DateTime<Utc>,
}

/// Public projection of a user shown to other parties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    /// Stable identifier.
    #[schema(value_type = String, format = Uuid)]
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Free-text location.
    pub location: Option<String>,
    /// Short biography.
    pub bio: Option<String>,
}

impl From<&User> for PublicProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            location: user.location.clone(),
            bio: user.bio.clone(),
        }
    }
}

/// Claims presented by the identity provider when a session starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityClaims {
    /// Provider subject.
    pub subject: SubjectId,
    /// Name the provider knows the user by.
    pub name: String,
    /// Verified email address.
    pub email: String,
}

impl IdentityClaims {
    /// Validate raw claims.
    pub fn try_new(subject: &str, name: &str, email: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            subject: SubjectId::new(subject)?,
            name: required_text("name", name, NAME_MAX)?,
            email: validate_email(email)?,
        })
    }
}

fn validate_email(email: &str) -> Result<String, ValidationError> {
    let email = required_text("email", email, EMAIL_MAX)?;
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(ValidationError::Invalid {
            field: "email",
            reason: "must look like an email address".to_owned(),
        }),
    }
}

/// Validated profile edit submitted from the settings page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    /// New display name.
    pub name: String,
    /// New phone number.
    pub phone: Option<String>,
    /// New location.
    pub location: Option<String>,
    /// New biography.
    pub bio: Option<String>,
    /// New preference set.
    pub preferences: AdopterPreferences,
}

/// Unvalidated profile edit.
#[derive(Debug, Clone, Default)]
pub struct ProfileDraft<'a> {
    /// Display name.
    pub name: &'a str,
    /// Phone number.
    pub phone: Option<&'a str>,
    /// Location.
    pub location: Option<&'a str>,
    /// Biography.
    pub bio: Option<&'a str>,
    /// Preference set.
    pub preferences: AdopterPreferences,
}

impl ProfileUpdate {
    /// Validate a draft.
    ///
    /// # Examples
    /// ```
    /// use adoption_backend::domain::{ProfileDraft, ProfileUpdate};
    ///
    /// let update = ProfileUpdate::try_from_draft(ProfileDraft {
    ///     name: " Ada ",
    ///     bio: Some("  "),
    ///     ..ProfileDraft::default()
    /// })
    /// .expect("valid draft");
    /// assert_eq!(update.name, "Ada");
    /// assert_eq!(update.bio, None);
    /// ```
    pub fn try_from_draft(draft: ProfileDraft<'_>) -> Result<Self, ValidationError> {
        Ok(Self {
            name: required_text("name", draft.name, NAME_MAX)?,
            phone: optional_text("phone", draft.phone, PHONE_MAX)?,
            location: optional_text("location", draft.location, LOCATION_MAX)?,
            bio: optional_text("bio", draft.bio, BIO_MAX)?,
            preferences: draft.preferences.normalised(),
        })
    }
}

impl User {
    /// Create a user from freshly presented identity claims.
    pub fn from_claims(id: UserId, claims: IdentityClaims, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            subject: claims.subject,
            name: claims.name,
            email: claims.email,
            phone: None,
            location: None,
            bio: None,
            preferences: AdopterPreferences::default(),
            created_at,
        }
    }

    /// Apply a validated profile edit.
    pub fn apply(&mut self, update: ProfileUpdate) {
        let ProfileUpdate {
            name,
            phone,
            location,
            bio,
            preferences,
        } = update;
        self.name = name;
        self.phone = phone;
        self.location = location;
        self.bio = bio;
        self.preferences = preferences;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "blank")]
    #[case(" user_1", "whitespace")]
    fn subject_rejects_malformed_input(#[case] raw: &str, #[case] _label: &str) {
        assert!(SubjectId::new(raw).is_err());
    }

    #[rstest]
    #[case("ada@example.com", true)]
    #[case("ada.example.com", false)]
    #[case("@example.com", false)]
    fn claims_validate_email(#[case] email: &str, #[case] valid: bool) {
        let result = IdentityClaims::try_new("user_1", "Ada", email);
        assert_eq!(result.is_ok(), valid);
    }

    #[rstest]
    fn profile_draft_requires_name() {
        let err = ProfileUpdate::try_from_draft(ProfileDraft {
            name: "  ",
            ..ProfileDraft::default()
        })
        .expect_err("blank name rejected");
        assert_eq!(err, ValidationError::Blank { field: "name" });
    }

    #[rstest]
    fn public_profile_hides_contact_details() {
        let claims = IdentityClaims::try_new("user_1", "Ada", "ada@example.com").expect("claims");
        let mut user = User::from_claims(UserId::random(), claims, Utc::now());
        user.phone = Some("555-0100".to_owned());

        let json = serde_json::to_value(PublicProfile::from(&user)).expect("serialise");
        assert!(json.get("email").is_none());
        assert!(json.get("phone").is_none());
        assert_eq!(json["name"], "Ada");
    }
}
