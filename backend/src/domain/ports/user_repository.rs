//! Port for user account persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Pet, SubjectId, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user repository adapters.
    pub enum UserRepositoryError for "user repository" {}
}

/// Port for storing and retrieving users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError>;

    /// Fetch a user by identity-provider subject.
    async fn find_by_subject(
        &self,
        subject: &SubjectId,
    ) -> Result<Option<User>, UserRepositoryError>;

    /// Insert `candidate` unless its subject is already registered, in which
    /// case refresh the stored name and email from `candidate`.
    ///
    /// Returns the stored row, whose id is the existing one on conflict.
    async fn upsert_by_subject(&self, candidate: &User) -> Result<User, UserRepositoryError>;

    /// Overwrite profile fields and preferences of an existing user.
    ///
    /// Returns `false` when no such user exists.
    async fn update_profile(&self, user: &User) -> Result<bool, UserRepositoryError>;

    /// Close an account in one atomic write.
    ///
    /// Soft-removes every listed pet the user owns (stamped with `at`),
    /// deletes their notifications, anonymises the user row and releases its
    /// subject. Applications and messages are left untouched. Closed accounts
    /// are invisible to every other method of this port.
    ///
    /// Returns the pets that were removed, or `None` when no such user exists.
    async fn delete(
        &self,
        id: &UserId,
        at: DateTime<Utc>,
    ) -> Result<Option<Vec<Pet>>, UserRepositoryError>;
}
