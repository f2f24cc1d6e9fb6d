//! Driving port for application reads.

use async_trait::async_trait;

use crate::domain::{Application, ApplicationId, Error, PetId, UserId};

/// Driving port for reading adoption applications.
///
/// Callers only ever see applications they are a party to.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApplicationQuery: Send + Sync {
    /// Fetch one application.
    async fn get(&self, id: &ApplicationId, caller: &UserId) -> Result<Application, Error>;

    /// The caller's most recent application for `pet`, if any.
    async fn latest_for_pet(
        &self,
        pet: &PetId,
        applicant: &UserId,
    ) -> Result<Option<Application>, Error>;

    /// Applications the caller sent, newest first.
    async fn list_sent(&self, applicant: &UserId) -> Result<Vec<Application>, Error>;

    /// Applications for the caller's pets, newest first.
    async fn list_received(&self, owner: &UserId) -> Result<Vec<Application>, Error>;
}
