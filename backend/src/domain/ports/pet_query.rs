//! Driving port for listing reads.

use async_trait::async_trait;

use crate::domain::{AdopterPreferences, Error, Pet, PetId, UserId};

/// Driving port for browsing pet listings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PetQuery: Send + Sync {
    /// Fetch a listing. Removed listings are reported as missing.
    async fn get(&self, id: &PetId) -> Result<Pet, Error>;

    /// Every available listing, oldest first.
    async fn list_available(&self) -> Result<Vec<Pet>, Error>;

    /// Listings owned by `owner`, including adopted ones.
    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<Pet>, Error>;

    /// Listings matching `preferences`, or the viewer's stored preferences
    /// when `None`.
    async fn recommend(
        &self,
        viewer: &UserId,
        preferences: Option<AdopterPreferences>,
    ) -> Result<Vec<Pet>, Error>;
}
