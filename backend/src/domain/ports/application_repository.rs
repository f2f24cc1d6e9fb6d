//! Port for adoption application persistence.
//!
//! Writes that carry a notification side effect take the notification as an
//! argument so adapters can commit both in one transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Application, ApplicationId, ApplicationStatus, Notification, PetId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by application repository adapters.
    pub enum ApplicationRepositoryError for "application repository" {
        /// A pending or accepted application already exists for the pair.
        DuplicateActive => "an active application already exists for this pet and applicant",
        /// The application left `pending` before the conditional update ran.
        StaleState => "application is no longer pending",
        /// No application with the given id exists.
        NotFound => "application not found",
    }
}

/// Port for storing and retrieving adoption applications.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// Store a new pending application together with the owner's
    /// notification.
    ///
    /// Fails with [`ApplicationRepositoryError::DuplicateActive`] when the
    /// applicant already holds a pending or accepted application for the pet.
    async fn create_with_notification(
        &self,
        application: &Application,
        notification: &Notification,
    ) -> Result<(), ApplicationRepositoryError>;

    /// Fetch an application by id.
    async fn find_by_id(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<Application>, ApplicationRepositoryError>;

    /// Every application `applicant` made for `pet`, oldest first.
    async fn list_for_pet_and_applicant(
        &self,
        pet: &PetId,
        applicant: &UserId,
    ) -> Result<Vec<Application>, ApplicationRepositoryError>;

    /// Applications sent by `applicant`, newest first.
    async fn list_by_applicant(
        &self,
        applicant: &UserId,
    ) -> Result<Vec<Application>, ApplicationRepositoryError>;

    /// Applications received by `owner`, newest first.
    async fn list_by_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<Application>, ApplicationRepositoryError>;

    /// Move a pending application to `status` and store the applicant's
    /// notification in the same unit of work.
    ///
    /// The write only applies while the stored status is still `pending`;
    /// otherwise nothing is written and
    /// [`ApplicationRepositoryError::StaleState`] is returned.
    async fn decide_with_notification(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
        decided_at: DateTime<Utc>,
        notification: &Notification,
    ) -> Result<Application, ApplicationRepositoryError>;
}
