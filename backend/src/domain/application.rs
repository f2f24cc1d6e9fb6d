//! Adoption applications and their status lifecycle.
//!
//! [`ApplicationStatus::decide`] is the only place a new status is computed.
//! Repositories persist the result with a conditional write so that two
//! racing decisions cannot both succeed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::validation::{ValidationError, optional_text, required_text};
use super::{ApplicationId, Pet, PetId, UserId};

const ANSWER_MAX: usize = 2000;

/// Status of an adoption application.
///
/// `Pending` is the initial state; `Accepted` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    /// Awaiting the owner's decision.
    Pending,
    /// Approved by the owner; messaging is open.
    Accepted,
    /// Declined by the owner.
    Rejected,
}

/// Owner decision on a pending application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    /// Approve the application.
    Accept,
    /// Decline the application.
    Reject,
}

/// Raised when a decision targets an application that is not pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("application is already {current}")]
pub struct TransitionError {
    /// Status the application already holds.
    pub current: ApplicationStatus,
}

impl ApplicationStatus {
    /// Stable string form used on the wire and in storage.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    /// Compute the status reached by applying `decision`.
    ///
    /// # Examples
    /// ```
    /// use adoption_backend::domain::{ApplicationStatus, Decision};
    ///
    /// let next = ApplicationStatus::Pending.decide(Decision::Accept);
    /// assert_eq!(next, Ok(ApplicationStatus::Accepted));
    /// assert!(ApplicationStatus::Accepted.decide(Decision::Reject).is_err());
    /// ```
    pub const fn decide(self, decision: Decision) -> Result<Self, TransitionError> {
        match (self, decision) {
            (Self::Pending, Decision::Accept) => Ok(Self::Accepted),
            (Self::Pending, Decision::Reject) => Ok(Self::Rejected),
            (current, _) => Err(TransitionError { current }),
        }
    }

    /// True for statuses that block a second application to the same pet.
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Accepted)
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown application status: {input}")]
pub struct ParseApplicationStatusError {
    /// The unrecognised input value.
    pub input: String,
}

impl std::str::FromStr for ApplicationStatus {
    type Err = ParseApplicationStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            _ => Err(ParseApplicationStatusError {
                input: s.to_owned(),
            }),
        }
    }
}

impl Decision {
    /// Map a requested target status onto a decision.
    ///
    /// Returns `None` for `Pending`, which no decision reaches.
    pub const fn targeting(status: ApplicationStatus) -> Option<Self> {
        match status {
            ApplicationStatus::Accepted => Some(Self::Accept),
            ApplicationStatus::Rejected => Some(Self::Reject),
            ApplicationStatus::Pending => None,
        }
    }
}

/// Answers supplied with an adoption application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Questionnaire {
    /// Why the applicant wants this pet.
    pub reason: String,
    /// Prior experience with animals.
    pub experience: Option<String>,
    /// Description of the home.
    pub living_space: Option<String>,
    /// Typical working hours.
    pub work_schedule: Option<String>,
    /// Other animals in the household.
    pub other_pets: String,
    /// People who can vouch for the applicant.
    pub references: Option<String>,
    /// Anything else the owner should know.
    pub additional_info: Option<String>,
}

impl Questionnaire {
    /// Trim every answer and check the required ones are present.
    pub fn validated(self) -> Result<Self, ValidationError> {
        Ok(Self {
            reason: required_text("reason", &self.reason, ANSWER_MAX)?,
            experience: optional_text("experience", self.experience.as_deref(), ANSWER_MAX)?,
            living_space: optional_text("livingSpace", self.living_space.as_deref(), ANSWER_MAX)?,
            work_schedule: optional_text("workSchedule", self.work_schedule.as_deref(), ANSWER_MAX)?,
            other_pets: required_text("otherPets", &self.other_pets, ANSWER_MAX)?,
            references: optional_text("references", self.references.as_deref(), ANSWER_MAX)?,
            additional_info: optional_text(
                "additionalInfo",
                self.additional_info.as_deref(),
                ANSWER_MAX,
            )?,
        })
    }
}

/// An adoption application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    /// Application identifier.
    #[schema(value_type = String, format = Uuid)]
    pub id: ApplicationId,
    /// Pet applied for.
    #[schema(value_type = String, format = Uuid)]
    pub pet_id: PetId,
    /// User applying.
    #[schema(value_type = String, format = Uuid)]
    pub applicant_id: UserId,
    /// Pet owner at the time of application; derived from the pet.
    #[schema(value_type = String, format = Uuid)]
    pub owner_id: UserId,
    /// Applicant's answers.
    pub questionnaire: Questionnaire,
    /// Current status.
    pub status: ApplicationStatus,
    /// Submission time.
    pub created_at: DateTime<Utc>,
    /// Time of the owner's decision.
    pub decided_at: Option<DateTime<Utc>>,
}

impl Application {
    /// Open a pending application for `pet`.
    ///
    /// The owner is always copied from the pet; callers cannot supply it.
    pub fn submit(
        id: ApplicationId,
        pet: &Pet,
        applicant_id: UserId,
        questionnaire: Questionnaire,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            pet_id: pet.id,
            applicant_id,
            owner_id: pet.owner_id,
            questionnaire,
            status: ApplicationStatus::Pending,
            created_at: now,
            decided_at: None,
        }
    }

    /// True when `user` is the applicant or the owner.
    pub fn involves(&self, user: &UserId) -> bool {
        self.applicant_id == *user || self.owner_id == *user
    }

    /// The party opposite `user`, if `user` is a party at all.
    pub fn counterpart_of(&self, user: &UserId) -> Option<UserId> {
        if self.applicant_id == *user {
            Some(self.owner_id)
        } else if self.owner_id == *user {
            Some(self.applicant_id)
        } else {
            None
        }
    }
}
