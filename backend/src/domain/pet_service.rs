//! Pet listing services.
//!
//! [`PetService`] implements [`PetCommand`] and [`PetQuery`]. Mutations are
//! gated by [`access::ensure_pet_owner`]; removal is soft so that
//! applications referencing the pet stay readable.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::debug;

use crate::domain::access::ensure_pet_owner;
use crate::domain::ports::{ChangePublisher, PetCommand, PetQuery, PetRepository, UserRepository};
use crate::domain::recommendation::recommend;
use crate::domain::repository_errors::{map_pet_error, map_user_error};
use crate::domain::{
    AdopterPreferences, ChangeEvent, ChangeKind, Error, Pet, PetAttributes, PetId, UserId,
};

/// Listing service implementing the pet driving ports.
#[derive(Clone)]
pub struct PetService<P, U> {
    pets: Arc<P>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
    changes: Arc<dyn ChangePublisher>,
}

impl<P, U> PetService<P, U> {
    /// Create a new service.
    pub fn new(
        pets: Arc<P>,
        users: Arc<U>,
        clock: Arc<dyn Clock>,
        changes: Arc<dyn ChangePublisher>,
    ) -> Self {
        Self {
            pets,
            users,
            clock,
            changes,
        }
    }
}

impl<P, U> PetService<P, U>
where
    P: PetRepository,
    U: UserRepository,
{
    /// Load a listing that has not been removed.
    async fn load_listed(&self, id: &PetId) -> Result<Pet, Error> {
        self.pets
            .find_by_id(id)
            .await
            .map_err(map_pet_error)?
            .filter(|pet| !pet.is_removed)
            .ok_or_else(|| Error::not_found(format!("pet {id} not found")))
    }

    async fn store(&self, pet: &Pet) -> Result<(), Error> {
        let written = self.pets.update(pet).await.map_err(map_pet_error)?;
        if written {
            Ok(())
        } else {
            Err(Error::not_found(format!("pet {} not found", pet.id)))
        }
    }
}

#[async_trait]
impl<P, U> PetCommand for PetService<P, U>
where
    P: PetRepository,
    U: UserRepository,
{
    async fn create(&self, owner: &UserId, attributes: PetAttributes) -> Result<Pet, Error> {
        let pet = Pet::new(PetId::random(), *owner, attributes, self.clock.utc());
        self.pets.insert(&pet).await.map_err(map_pet_error)?;
        debug!(pet_id = %pet.id, owner_id = %owner, "listed pet");
        self.changes.publish(ChangeEvent::pet(&pet, ChangeKind::Created));
        Ok(pet)
    }

    async fn update(
        &self,
        id: &PetId,
        caller: &UserId,
        attributes: PetAttributes,
    ) -> Result<Pet, Error> {
        let mut pet = self.load_listed(id).await?;
        ensure_pet_owner(&pet, caller)?;
        pet.apply(attributes, self.clock.utc());
        self.store(&pet).await?;
        self.changes.publish(ChangeEvent::pet(&pet, ChangeKind::Updated));
        Ok(pet)
    }

    async fn remove(&self, id: &PetId, caller: &UserId) -> Result<(), Error> {
        let mut pet = self.load_listed(id).await?;
        ensure_pet_owner(&pet, caller)?;
        let now = self.clock.utc();
        if !self.pets.remove(id, now).await.map_err(map_pet_error)? {
            return Err(Error::not_found(format!("pet {id} not found")));
        }
        pet.is_removed = true;
        pet.updated_at = now;
        debug!(pet_id = %pet.id, "removed pet listing");
        self.changes.publish(ChangeEvent::pet(&pet, ChangeKind::Removed));
        Ok(())
    }
}

#[async_trait]
impl<P, U> PetQuery for PetService<P, U>
where
    P: PetRepository,
    U: UserRepository,
{
    async fn get(&self, id: &PetId) -> Result<Pet, Error> {
        self.load_listed(id).await
    }

    async fn list_available(&self) -> Result<Vec<Pet>, Error> {
        self.pets.list_available().await.map_err(map_pet_error)
    }

    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<Pet>, Error> {
        self.pets.list_by_owner(owner).await.map_err(map_pet_error)
    }

    async fn recommend(
        &self,
        viewer: &UserId,
        preferences: Option<AdopterPreferences>,
    ) -> Result<Vec<Pet>, Error> {
        let preferences = match preferences {
            Some(preferences) => preferences.normalised(),
            None => {
                self.users
                    .find_by_id(viewer)
                    .await
                    .map_err(map_user_error)?
                    .ok_or_else(|| Error::not_found(format!("user {viewer} not found")))?
                    .preferences
            }
        };
        let candidates = self.pets.list_available().await.map_err(map_pet_error)?;
        Ok(recommend(&preferences, viewer, candidates))
    }
}
