//! PostgreSQL-backed `ApplicationRepository` implementation using Diesel ORM.
//!
//! Submission and decision each run in one transaction together with the
//! notification they produce. The active-application rule is enforced by the
//! `applications_active_pair_key` partial unique index, and decisions use a
//! conditional `UPDATE ... WHERE status = 'pending'`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{ApplicationRepository, ApplicationRepositoryError};
use crate::domain::{
    Application, ApplicationId, ApplicationStatus, Notification, PetId, UserId,
};

use super::diesel_helpers::{
    is_unique_violation, map_corrupt_row, map_diesel_error, map_json_error, map_pool_error,
};
use super::models::{ApplicationRow, NotificationRow};
use super::pool::DbPool;
use super::schema::{applications, notifications};

const ACTIVE_PAIR_CONSTRAINT: &str = "applications_active_pair_key";

/// Diesel-backed adoption applications.
#[derive(Clone)]
pub struct DieselApplicationRepository {
    pool: DbPool,
}

impl DieselApplicationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Outcome of the conditional decision update inside its transaction.
enum DecideFailure {
    Diesel(diesel::result::Error),
    Stale,
    Missing,
}

impl From<diesel::result::Error> for DecideFailure {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

fn to_domain(row: ApplicationRow) -> Result<Application, ApplicationRepositoryError> {
    Application::try_from(row).map_err(map_corrupt_row)
}

fn all_to_domain(rows: Vec<ApplicationRow>) -> Result<Vec<Application>, ApplicationRepositoryError> {
    rows.into_iter().map(to_domain).collect()
}

#[async_trait]
impl ApplicationRepository for DieselApplicationRepository {
    async fn create_with_notification(
        &self,
        application: &Application,
        notification: &Notification,
    ) -> Result<(), ApplicationRepositoryError> {
        let row = ApplicationRow::from_domain(application).map_err(map_json_error)?;
        let notification_row = NotificationRow::from(notification);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            async move {
                diesel::insert_into(applications::table)
                    .values(&row)
                    .execute(conn)
                    .await?;
                diesel::insert_into(notifications::table)
                    .values(&notification_row)
                    .execute(conn)
                    .await?;
                Ok::<_, diesel::result::Error>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(|error| {
            if is_unique_violation(&error, ACTIVE_PAIR_CONSTRAINT) {
                ApplicationRepositoryError::duplicate_active()
            } else {
                map_diesel_error(error)
            }
        })
    }

    async fn find_by_id(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<Application>, ApplicationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        applications::table
            .find(id.as_uuid())
            .select(ApplicationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(to_domain)
            .transpose()
    }

    async fn list_for_pet_and_applicant(
        &self,
        pet: &PetId,
        applicant: &UserId,
    ) -> Result<Vec<Application>, ApplicationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = applications::table
            .filter(applications::pet_id.eq(pet.as_uuid()))
            .filter(applications::applicant_id.eq(applicant.as_uuid()))
            .order((applications::created_at.asc(), applications::id.asc()))
            .select(ApplicationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        all_to_domain(rows)
    }

    async fn list_by_applicant(
        &self,
        applicant: &UserId,
    ) -> Result<Vec<Application>, ApplicationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = applications::table
            .filter(applications::applicant_id.eq(applicant.as_uuid()))
            .order((applications::created_at.desc(), applications::id.desc()))
            .select(ApplicationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        all_to_domain(rows)
    }

    async fn list_by_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<Application>, ApplicationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = applications::table
            .filter(applications::owner_id.eq(owner.as_uuid()))
            .order((applications::created_at.desc(), applications::id.desc()))
            .select(ApplicationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        all_to_domain(rows)
    }

    async fn decide_with_notification(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
        decided_at: DateTime<Utc>,
        notification: &Notification,
    ) -> Result<Application, ApplicationRepositoryError> {
        let id = *id.as_uuid();
        let notification_row = NotificationRow::from(notification);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = conn
            .transaction(|conn| {
                async move {
                    let updated = diesel::update(
                        applications::table
                            .find(id)
                            .filter(applications::status.eq(ApplicationStatus::Pending.as_str())),
                    )
                    .set((
                        applications::status.eq(status.as_str()),
                        applications::decided_at.eq(Some(decided_at)),
                    ))
                    .returning(ApplicationRow::as_returning())
                    .get_result(conn)
                    .await
                    .optional()?;

                    let Some(row) = updated else {
                        let exists: i64 = applications::table
                            .find(id)
                            .count()
                            .get_result(conn)
                            .await?;
                        return Err(if exists == 0 {
                            DecideFailure::Missing
                        } else {
                            DecideFailure::Stale
                        });
                    };

                    diesel::insert_into(notifications::table)
                        .values(&notification_row)
                        .execute(conn)
                        .await?;
                    Ok(row)
                }
                .scope_boxed()
            })
            .await
            .map_err(|failure| match failure {
                DecideFailure::Diesel(error) => map_diesel_error(error),
                DecideFailure::Stale => ApplicationRepositoryError::stale_state(),
                DecideFailure::Missing => ApplicationRepositoryError::not_found(),
            })?;
        to_domain(row)
    }
}
