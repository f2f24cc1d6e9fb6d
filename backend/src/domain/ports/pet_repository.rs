//! Port for pet listing persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Pet, PetId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by pet repository adapters.
    pub enum PetRepositoryError for "pet repository" {}
}

/// Port for storing and retrieving pet listings.
///
/// Lookups by id return soft-removed rows so callers can distinguish
/// "removed" from "never existed" when they need to; list queries never do.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PetRepository: Send + Sync {
    /// Store a new listing.
    async fn insert(&self, pet: &Pet) -> Result<(), PetRepositoryError>;

    /// Fetch a listing by id, including soft-removed ones.
    async fn find_by_id(&self, id: &PetId) -> Result<Option<Pet>, PetRepositoryError>;

    /// Overwrite a listing's mutable fields; `owner_id` and the removal flag
    /// are never written.
    ///
    /// Returns `false` when no such listing exists or it has been removed.
    async fn update(&self, pet: &Pet) -> Result<bool, PetRepositoryError>;

    /// Soft-remove a listing, stamping `updated_at` with `at`.
    ///
    /// Returns `false` when no such listing exists or it was already removed.
    async fn remove(&self, id: &PetId, at: DateTime<Utc>) -> Result<bool, PetRepositoryError>;

    /// Non-removed listings owned by `owner`, oldest first.
    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<Pet>, PetRepositoryError>;

    /// Available, non-removed listings, oldest first.
    async fn list_available(&self) -> Result<Vec<Pet>, PetRepositoryError>;
}
