//! PostgreSQL-backed `PetRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{PetRepository, PetRepositoryError};
use crate::domain::{Pet, PetId, UserId};

use super::diesel_helpers::{map_corrupt_row, map_diesel_error, map_pool_error};
use super::models::{PetChangeset, PetRow};
use super::pool::DbPool;
use super::schema::pets;

/// Diesel-backed pet listings.
#[derive(Clone)]
pub struct DieselPetRepository {
    pool: DbPool,
}

impl DieselPetRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn to_domain(rows: Vec<PetRow>) -> Result<Vec<Pet>, PetRepositoryError> {
    rows.into_iter()
        .map(|row| Pet::try_from(row).map_err(map_corrupt_row))
        .collect()
}

#[async_trait]
impl PetRepository for DieselPetRepository {
    async fn insert(&self, pet: &Pet) -> Result<(), PetRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(pets::table)
            .values(PetRow::from_domain(pet))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &PetId) -> Result<Option<Pet>, PetRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        pets::table
            .find(id.as_uuid())
            .select(PetRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(|row| Pet::try_from(row).map_err(map_corrupt_row))
            .transpose()
    }

    async fn update(&self, pet: &Pet) -> Result<bool, PetRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(
            pets::table
                .find(pet.id.as_uuid())
                .filter(pets::is_removed.eq(false)),
        )
        .set(PetChangeset::from_domain(pet))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn remove(&self, id: &PetId, at: DateTime<Utc>) -> Result<bool, PetRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::update(
            pets::table
                .find(id.as_uuid())
                .filter(pets::is_removed.eq(false)),
        )
        .set((pets::is_removed.eq(true), pets::updated_at.eq(at)))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }

    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<Pet>, PetRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = pets::table
            .filter(pets::owner_id.eq(owner.as_uuid()))
            .filter(pets::is_removed.eq(false))
            .order((pets::created_at.asc(), pets::id.asc()))
            .select(PetRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        to_domain(rows)
    }

    async fn list_available(&self) -> Result<Vec<Pet>, PetRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = pets::table
            .filter(pets::is_available.eq(true))
            .filter(pets::is_removed.eq(false))
            .order((pets::created_at.asc(), pets::id.asc()))
            .select(PetRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        to_domain(rows)
    }
}
