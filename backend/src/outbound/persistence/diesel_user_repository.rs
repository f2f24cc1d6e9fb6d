//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Closed accounts keep their row so applications and messages still resolve
//! their foreign keys. The row is anonymised, stamped with `deleted_at` and
//! its subject rewritten, and every query here skips it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{Pet, SubjectId, User, UserId};

use super::diesel_helpers::{map_corrupt_row, map_diesel_error, map_json_error, map_pool_error};
use super::models::{PetRow, ProfileChangeset, UserRow};
use super::pool::DbPool;
use super::schema::{notifications, pets, users};

const CLOSED_ACCOUNT_NAME: &str = "Deleted user";

/// Diesel-backed user accounts.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn to_domain(row: UserRow) -> Result<User, UserRepositoryError> {
    User::try_from(row).map_err(map_corrupt_row)
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        users::table
            .find(id.as_uuid())
            .filter(users::deleted_at.is_null())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(to_domain)
            .transpose()
    }

    async fn find_by_subject(
        &self,
        subject: &SubjectId,
    ) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        users::table
            .filter(users::subject.eq(subject.as_ref()))
            .filter(users::deleted_at.is_null())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(to_domain)
            .transpose()
    }

    async fn upsert_by_subject(&self, candidate: &User) -> Result<User, UserRepositoryError> {
        let row = UserRow::from_domain(candidate).map_err(map_json_error)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let stored = diesel::insert_into(users::table)
            .values(&row)
            .on_conflict(users::subject)
            .do_update()
            .set((
                users::name.eq(excluded(users::name)),
                users::email.eq(excluded(users::email)),
            ))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        to_domain(stored)
    }

    async fn update_profile(&self, user: &User) -> Result<bool, UserRepositoryError> {
        let changes = ProfileChangeset::from_domain(user).map_err(map_json_error)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(
            users::table
                .find(user.id.as_uuid())
                .filter(users::deleted_at.is_null()),
        )
        .set(&changes)
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn delete(
        &self,
        id: &UserId,
        at: DateTime<Utc>,
    ) -> Result<Option<Vec<Pet>>, UserRepositoryError> {
        let id = *id.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let removed = conn
            .transaction(|conn| {
                async move {
                    let closed = diesel::update(
                        users::table.find(id).filter(users::deleted_at.is_null()),
                    )
                    .set((
                        users::subject.eq(format!("closed:{id}")),
                        users::name.eq(CLOSED_ACCOUNT_NAME),
                        users::email.eq(""),
                        users::phone.eq(None::<String>),
                        users::location.eq(None::<String>),
                        users::bio.eq(None::<String>),
                        users::preferences.eq(serde_json::json!({})),
                        users::deleted_at.eq(Some(at)),
                    ))
                    .execute(conn)
                    .await?;
                    if closed == 0 {
                        return Ok(None);
                    }

                    let removed = diesel::update(
                        pets::table
                            .filter(pets::owner_id.eq(id))
                            .filter(pets::is_removed.eq(false)),
                    )
                    .set((pets::is_removed.eq(true), pets::updated_at.eq(at)))
                    .returning(PetRow::as_returning())
                    .get_results(conn)
                    .await?;
                    diesel::delete(notifications::table.filter(notifications::user_id.eq(id)))
                        .execute(conn)
                        .await?;
                    Ok::<_, diesel::result::Error>(Some(removed))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        removed
            .map(|rows| {
                rows.into_iter()
                    .map(|row| Pet::try_from(row).map_err(map_corrupt_row))
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()
    }
}
