//! PostgreSQL-backed `MessageRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{MessageRepository, MessageRepositoryError};
use crate::domain::{ApplicationId, Message, Notification};

use super::diesel_helpers::{map_diesel_error, map_pool_error};
use super::models::{MessageRow, NotificationRow};
use super::pool::DbPool;
use super::schema::{messages, notifications};

/// Diesel-backed application transcripts.
#[derive(Clone)]
pub struct DieselMessageRepository {
    pool: DbPool,
}

impl DieselMessageRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for DieselMessageRepository {
    async fn append_with_notification(
        &self,
        message: &Message,
        notification: &Notification,
    ) -> Result<(), MessageRepositoryError> {
        let message_row = MessageRow::from(message);
        let notification_row = NotificationRow::from(notification);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            async move {
                diesel::insert_into(messages::table)
                    .values(&message_row)
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
        .map_err(map_diesel_error)
    }

    async fn list_for_application(
        &self,
        application: &ApplicationId,
    ) -> Result<Vec<Message>, MessageRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = messages::table
            .filter(messages::application_id.eq(application.as_uuid()))
            .order((messages::created_at.asc(), messages::seq.asc()))
            .select(MessageRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Message::from).collect())
    }
}
