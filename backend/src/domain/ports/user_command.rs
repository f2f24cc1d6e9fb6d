//! Driving port for account mutations.
//!
//! The session endpoint calls [`UserCommand::sync_identity`] with the claims
//! vouched for by the identity provider; profile edits flow through
//! [`UserCommand::update_profile`] and account closure through
//! [`UserCommand::delete_account`].

use async_trait::async_trait;

use crate::domain::{Error, IdentityClaims, ProfileUpdate, User, UserId};

/// Driving port for creating and editing user accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserCommand: Send + Sync {
    /// Create the account for `claims` on first sight, or refresh its name
    /// and email on later sign-ins.
    async fn sync_identity(&self, claims: IdentityClaims) -> Result<User, Error>;

    /// Replace the caller's profile fields and adopter preferences.
    async fn update_profile(&self, user_id: &UserId, update: ProfileUpdate) -> Result<User, Error>;

    /// Close the caller's account.
    ///
    /// Their listings are removed and their notifications dropped; the
    /// applications they took part in stay visible to the other party.
    async fn delete_account(&self, user_id: &UserId) -> Result<(), Error>;
}
