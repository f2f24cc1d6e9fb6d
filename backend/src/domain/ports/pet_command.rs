//! Driving port for listing mutations.

use async_trait::async_trait;

use crate::domain::{Error, Pet, PetAttributes, PetId, UserId};

/// Driving port for creating, editing and removing pet listings.
///
/// Every mutation other than creation requires the caller to own the pet.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PetCommand: Send + Sync {
    /// List a new pet owned by `owner`.
    async fn create(&self, owner: &UserId, attributes: PetAttributes) -> Result<Pet, Error>;

    /// Replace a listing's attributes.
    async fn update(
        &self,
        id: &PetId,
        caller: &UserId,
        attributes: PetAttributes,
    ) -> Result<Pet, Error>;

    /// Soft-remove a listing. Its applications are kept.
    async fn remove(&self, id: &PetId, caller: &UserId) -> Result<(), Error>;
}
