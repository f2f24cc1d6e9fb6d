//! Driving port for the application lifecycle.

use async_trait::async_trait;

use crate::domain::{Application, ApplicationId, ApplicationStatus, Error, PetId, Questionnaire, UserId};

/// Driving port for submitting and deciding adoption applications.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApplicationCommand: Send + Sync {
    /// Apply for `pet` on behalf of `applicant`.
    ///
    /// The pet's owner receives an `adoption_request` notification.
    async fn submit(
        &self,
        pet: &PetId,
        applicant: &UserId,
        questionnaire: Questionnaire,
    ) -> Result<Application, Error>;

    /// Accept or reject a pending application.
    ///
    /// Only the pet's owner may decide. The applicant receives an
    /// `application_update` notification.
    async fn decide(
        &self,
        id: &ApplicationId,
        caller: &UserId,
        status: ApplicationStatus,
    ) -> Result<Application, Error>;
}
