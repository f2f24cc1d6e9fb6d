//! PostgreSQL-backed `NotificationRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{NotificationRepository, NotificationRepositoryError};
use crate::domain::{Notification, NotificationId, UserId};

use super::diesel_helpers::{map_corrupt_row, map_diesel_error, map_pool_error};
use super::models::NotificationRow;
use super::pool::DbPool;
use super::schema::notifications;

/// Diesel-backed user notifications.
#[derive(Clone)]
pub struct DieselNotificationRepository {
    pool: DbPool,
}

impl DieselNotificationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn to_domain(row: NotificationRow) -> Result<Notification, NotificationRepositoryError> {
    Notification::try_from(row).map_err(map_corrupt_row)
}

#[async_trait]
impl NotificationRepository for DieselNotificationRepository {
    async fn insert(&self, notification: &Notification) -> Result<(), NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(notifications::table)
            .values(NotificationRow::from(notification))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(
        &self,
        id: &NotificationId,
    ) -> Result<Option<Notification>, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        notifications::table
            .find(id.as_uuid())
            .select(NotificationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(to_domain)
            .transpose()
    }

    async fn mark_read(&self, id: &NotificationId) -> Result<bool, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let flipped = diesel::update(
            notifications::table
                .find(id.as_uuid())
                .filter(notifications::is_read.eq(false)),
        )
        .set(notifications::is_read.eq(true))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(flipped > 0)
    }

    async fn list_for_user(
        &self,
        user: &UserId,
    ) -> Result<Vec<Notification>, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = notifications::table
            .filter(notifications::user_id.eq(user.as_uuid()))
            .order((notifications::created_at.desc(), notifications::id.desc()))
            .select(NotificationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(to_domain).collect()
    }

    async fn unread_count(&self, user: &UserId) -> Result<u64, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let count: i64 = notifications::table
            .filter(notifications::user_id.eq(user.as_uuid()))
            .filter(notifications::is_read.eq(false))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}
