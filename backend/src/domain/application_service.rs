//! Adoption application services.
//!
//! [`ApplicationService`] drives the pending → accepted/rejected lifecycle.
//! Every transition is computed by [`ApplicationStatus::decide`] and then
//! persisted with a conditional write, so a decision racing another one
//! loses with a `stale_state` error instead of overwriting it.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::access::{ensure_can_apply, ensure_can_decide, ensure_party};
use crate::domain::ports::{
    ApplicationCommand, ApplicationQuery, ApplicationRepository, ChangePublisher, PetRepository,
    UserRepository,
};
use crate::domain::repository_errors::{
    duplicate_application, map_application_error, map_pet_error, map_user_error,
};
use crate::domain::{
    AdoptionPolicy, Application, ApplicationId, ApplicationStatus, ChangeEvent, ChangeKind,
    Decision, Error, Notification, NotificationDraft, NotificationId, Pet, PetId, Questionnaire,
    UserId,
};

/// Application service implementing the application driving ports.
#[derive(Clone)]
pub struct ApplicationService<A, P, U> {
    applications: Arc<A>,
    pets: Arc<P>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
    changes: Arc<dyn ChangePublisher>,
    policy: AdoptionPolicy,
}

impl<A, P, U> ApplicationService<A, P, U> {
    /// Create a new service.
    pub fn new(
        applications: Arc<A>,
        pets: Arc<P>,
        users: Arc<U>,
        clock: Arc<dyn Clock>,
        changes: Arc<dyn ChangePublisher>,
        policy: AdoptionPolicy,
    ) -> Self {
        Self {
            applications,
            pets,
            users,
            clock,
            changes,
            policy,
        }
    }
}

impl<A, P, U> ApplicationService<A, P, U>
where
    A: ApplicationRepository,
    P: PetRepository,
    U: UserRepository,
{
    async fn load(&self, id: &ApplicationId) -> Result<Application, Error> {
        self.applications
            .find_by_id(id)
            .await
            .map_err(map_application_error)?
            .ok_or_else(|| Error::not_found(format!("application {id} not found")))
    }

    async fn load_pet(&self, id: &PetId) -> Result<Pet, Error> {
        self.pets
            .find_by_id(id)
            .await
            .map_err(map_pet_error)?
            .ok_or_else(|| Error::not_found(format!("pet {id} not found")))
    }

    /// Reject a new application when an earlier one for the same pet blocks it.
    fn check_history(&self, history: &[Application]) -> Result<(), Error> {
        if history.iter().any(|previous| previous.status.is_active()) {
            return Err(duplicate_application());
        }
        let rejected_before = history
            .iter()
            .any(|previous| previous.status == ApplicationStatus::Rejected);
        if rejected_before && !self.policy.allow_reapply_after_rejection {
            return Err(
                Error::invalid_state("a rejected application cannot be resubmitted")
                    .with_details(json!({ "reason": "reapply_not_allowed" })),
            );
        }
        Ok(())
    }

    fn notify(&self, application: &Application, notification: &Notification, change: ChangeKind) {
        self.changes
            .publish(ChangeEvent::application(application, change));
        self.changes
            .publish(ChangeEvent::notification(notification, ChangeKind::Created));
    }
}

#[async_trait]
impl<A, P, U> ApplicationCommand for ApplicationService<A, P, U>
where
    A: ApplicationRepository,
    P: PetRepository,
    U: UserRepository,
{
    async fn submit(
        &self,
        pet_id: &PetId,
        applicant: &UserId,
        questionnaire: Questionnaire,
    ) -> Result<Application, Error> {
        let questionnaire = questionnaire.validated()?;
        let pet = self.load_pet(pet_id).await?;
        if pet.is_removed {
            return Err(Error::not_found(format!("pet {pet_id} not found")));
        }
        ensure_can_apply(&pet, applicant)?;

        let applicant_user = self
            .users
            .find_by_id(applicant)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found(format!("user {applicant} not found")))?;

        let history = self
            .applications
            .list_for_pet_and_applicant(pet_id, applicant)
            .await
            .map_err(map_application_error)?;
        self.check_history(&history)?;

        let now = self.clock.utc();
        let application =
            Application::submit(ApplicationId::random(), &pet, *applicant, questionnaire, now);
        let notification = Notification::from_draft(
            NotificationId::random(),
            NotificationDraft::adoption_request(&application, &pet, &applicant_user),
            now,
        );
        self.applications
            .create_with_notification(&application, &notification)
            .await
            .map_err(map_application_error)?;

        info!(
            application_id = %application.id,
            pet_id = %pet.id,
            applicant_id = %applicant,
            "adoption application submitted"
        );
        self.notify(&application, &notification, ChangeKind::Created);
        Ok(application)
    }

    async fn decide(
        &self,
        id: &ApplicationId,
        caller: &UserId,
        status: ApplicationStatus,
    ) -> Result<Application, Error> {
        let decision = Decision::targeting(status).ok_or_else(|| {
            Error::invalid_request("status must be accepted or rejected")
                .with_details(json!({ "field": "status", "code": "invalid" }))
        })?;
        let current = self.load(id).await?;
        ensure_can_decide(&current, caller)?;
        let next = current.status.decide(decision).map_err(|err| {
            Error::invalid_state(err.to_string()).with_details(json!({ "status": err.current }))
        })?;

        let pet = self.load_pet(&current.pet_id).await?;
        let now = self.clock.utc();
        let decided = Application {
            status: next,
            decided_at: Some(now),
            ..current
        };
        let notification = Notification::from_draft(
            NotificationId::random(),
            NotificationDraft::application_update(&decided, &pet.name),
            now,
        );
        let stored = self
            .applications
            .decide_with_notification(id, next, now, &notification)
            .await
            .map_err(map_application_error)?;

        info!(application_id = %stored.id, status = %stored.status, "application decided");
        self.notify(&stored, &notification, ChangeKind::Updated);
        Ok(stored)
    }
}

#[async_trait]
impl<A, P, U> ApplicationQuery for ApplicationService<A, P, U>
where
    A: ApplicationRepository,
    P: PetRepository,
    U: UserRepository,
{
    async fn get(&self, id: &ApplicationId, caller: &UserId) -> Result<Application, Error> {
        let application = self.load(id).await?;
        ensure_party(&application, caller)?;
        Ok(application)
    }

    async fn latest_for_pet(
        &self,
        pet: &PetId,
        applicant: &UserId,
    ) -> Result<Option<Application>, Error> {
        let history = self
            .applications
            .list_for_pet_and_applicant(pet, applicant)
            .await
            .map_err(map_application_error)?;
        Ok(history.into_iter().last())
    }

    async fn list_sent(&self, applicant: &UserId) -> Result<Vec<Application>, Error> {
        self.applications
            .list_by_applicant(applicant)
            .await
            .map_err(map_application_error)
    }

    async fn list_received(&self, owner: &UserId) -> Result<Vec<Application>, Error> {
        self.applications
            .list_by_owner(owner)
            .await
            .map_err(map_application_error)
    }
}

#[cfg(test)]
#[path = "application_service_tests.rs"]
mod tests;
