//! Driving port for account reads.

use async_trait::async_trait;

use crate::domain::{Error, PublicProfile, User, UserId};

/// Driving port for reading user accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserQuery: Send + Sync {
    /// Full account of the signed-in user.
    async fn current_user(&self, user_id: &UserId) -> Result<User, Error>;

    /// Profile fields any signed-in user may see.
    async fn public_profile(&self, user_id: &UserId) -> Result<PublicProfile, Error>;
}
