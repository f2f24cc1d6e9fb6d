//! User account services.
//!
//! Implements [`UserCommand`] and [`UserQuery`] over a [`UserRepository`].

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{ChangePublisher, UserCommand, UserQuery, UserRepository};
use crate::domain::repository_errors::map_user_error;
use crate::domain::{
    ChangeEvent, ChangeKind, Error, IdentityClaims, ProfileUpdate, PublicProfile, User, UserId,
};

/// Account service implementing the user driving ports.
#[derive(Clone)]
pub struct UserService<U> {
    users: Arc<U>,
    clock: Arc<dyn Clock>,
    changes: Arc<dyn ChangePublisher>,
}

impl<U> UserService<U> {
    /// Create a new service.
    pub fn new(users: Arc<U>, clock: Arc<dyn Clock>, changes: Arc<dyn ChangePublisher>) -> Self {
        Self {
            users,
            clock,
            changes,
        }
    }
}

impl<U: UserRepository> UserService<U> {
    async fn load(&self, user_id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found(format!("user {user_id} not found")))
    }
}

#[async_trait]
impl<U: UserRepository> UserCommand for UserService<U> {
    async fn sync_identity(&self, claims: IdentityClaims) -> Result<User, Error> {
        let candidate = User::from_claims(UserId::random(), claims, self.clock.utc());
        let stored = self
            .users
            .upsert_by_subject(&candidate)
            .await
            .map_err(map_user_error)?;

        let change = if stored.id == candidate.id {
            info!(user_id = %stored.id, "registered new user");
            ChangeKind::Created
        } else {
            ChangeKind::Updated
        };
        self.changes.publish(ChangeEvent::user(&stored.id, change));
        Ok(stored)
    }

    async fn update_profile(&self, user_id: &UserId, update: ProfileUpdate) -> Result<User, Error> {
        let mut user = self.load(user_id).await?;
        user.apply(update);
        let written = self
            .users
            .update_profile(&user)
            .await
            .map_err(map_user_error)?;
        if !written {
            return Err(Error::not_found(format!("user {user_id} not found")));
        }
        self.changes
            .publish(ChangeEvent::user(&user.id, ChangeKind::Updated));
        Ok(user)
    }

    async fn delete_account(&self, user_id: &UserId) -> Result<(), Error> {
        let removed = self
            .users
            .delete(user_id, self.clock.utc())
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found(format!("user {user_id} not found")))?;
        info!(user_id = %user_id, removed_pets = removed.len(), "closed user account");
        for pet in &removed {
            self.changes.publish(ChangeEvent::pet(pet, ChangeKind::Removed));
        }
        self.changes
            .publish(ChangeEvent::user(user_id, ChangeKind::Removed));
        Ok(())
    }
}

#[async_trait]
impl<U: UserRepository> UserQuery for UserService<U> {
    async fn current_user(&self, user_id: &UserId) -> Result<User, Error> {
        self.load(user_id).await
    }

    async fn public_profile(&self, user_id: &UserId) -> Result<PublicProfile, Error> {
        let user = self.load(user_id).await?;
        Ok(PublicProfile::from(&user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockChangePublisher, MockUserRepository, UserRepositoryError};
    use crate::domain::test_clock::{fixture_clock, fixture_timestamp};
    use crate::domain::pet::fixtures::{dog_draft, pet_from};
    use crate::domain::{EntityKind, ErrorCode, Pet, ProfileDraft, SubjectId};
    use rstest::{fixture, rstest};

    #[fixture]
    fn claims() -> IdentityClaims {
        IdentityClaims::try_new("user_2abc", "Ada", "ada@example.com").expect("valid claims")
    }

    fn stored(claims: IdentityClaims) -> User {
        User::from_claims(UserId::random(), claims, fixture_timestamp())
    }

    fn service(repo: MockUserRepository, changes: MockChangePublisher) -> UserService<MockUserRepository> {
        UserService::new(Arc::new(repo), fixture_clock(), Arc::new(changes))
    }

    #[rstest]
    #[tokio::test]
    async fn first_sign_in_creates_user(claims: IdentityClaims) {
        let mut repo = MockUserRepository::new();
        repo.expect_upsert_by_subject()
            .times(1)
            .returning(|candidate| Ok(candidate.clone()));
        let mut changes = MockChangePublisher::new();
        changes
            .expect_publish()
            .withf(|event| event.change == ChangeKind::Created)
            .times(1)
            .return_const(());

        let user = service(repo, changes)
            .sync_identity(claims)
            .await
            .expect("sign in succeeds");

        assert_eq!(user.subject, SubjectId::new("user_2abc").expect("subject"));
        assert_eq!(user.created_at, fixture_timestamp());
    }

    #[rstest]
    #[tokio::test]
    async fn repeat_sign_in_keeps_existing_id(claims: IdentityClaims) {
        let existing = stored(claims.clone());
        let existing_id = existing.id;
        let mut repo = MockUserRepository::new();
        repo.expect_upsert_by_subject()
            .times(1)
            .return_once(move |_| Ok(existing));
        let mut changes = MockChangePublisher::new();
        changes
            .expect_publish()
            .withf(|event| event.change == ChangeKind::Updated)
            .times(1)
            .return_const(());

        let user = service(repo, changes)
            .sync_identity(claims)
            .await
            .expect("sign in succeeds");

        assert_eq!(user.id, existing_id);
    }

    #[rstest]
    #[tokio::test]
    async fn update_profile_applies_changes(claims: IdentityClaims) {
        let existing = stored(claims);
        let user_id = existing.id;
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id()
            .return_once(move |_| Ok(Some(existing)));
        repo.expect_update_profile()
            .withf(|user| user.bio.as_deref() == Some("Dog person"))
            .times(1)
            .returning(|_| Ok(true));
        let mut changes = MockChangePublisher::new();
        changes.expect_publish().times(1).return_const(());

        let update = ProfileUpdate::try_from_draft(ProfileDraft {
            name: "Ada L.",
            bio: Some("Dog person"),
            ..ProfileDraft::default()
        })
        .expect("valid update");
        let user = service(repo, changes)
            .update_profile(&user_id, update)
            .await
            .expect("update succeeds");

        assert_eq!(user.name, "Ada L.");
    }

    #[rstest]
    #[tokio::test]
    async fn delete_account_announces_each_removed_listing(claims: IdentityClaims) {
        let user_id = stored(claims).id;
        let listings: Vec<Pet> = (0..2)
            .map(|_| pet_from(user_id, dog_draft(), fixture_timestamp()))
            .map(|mut pet| {
                pet.is_removed = true;
                pet
            })
            .collect();
        let mut repo = MockUserRepository::new();
        repo.expect_delete()
            .withf(move |id, at| *id == user_id && *at == fixture_timestamp())
            .times(1)
            .return_once(move |_, _| Ok(Some(listings)));
        let mut changes = MockChangePublisher::new();
        changes
            .expect_publish()
            .withf(|event| event.entity == EntityKind::Pet && event.change == ChangeKind::Removed)
            .times(2)
            .return_const(());
        changes
            .expect_publish()
            .withf(move |event| {
                event.entity == EntityKind::User
                    && event.id == *user_id.as_uuid()
                    && event.change == ChangeKind::Removed
            })
            .times(1)
            .return_const(());

        service(repo, changes)
            .delete_account(&user_id)
            .await
            .expect("account closed");
    }

    #[rstest]
    #[tokio::test]
    async fn deleting_a_closed_account_is_not_found() {
        let mut repo = MockUserRepository::new();
        repo.expect_delete().times(1).return_once(|_, _| Ok(None));

        let error = service(repo, MockChangePublisher::new())
            .delete_account(&UserId::random())
            .await
            .expect_err("already closed");

        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn missing_user_is_not_found() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().return_once(|_| Ok(None));

        let error = service(repo, MockChangePublisher::new())
            .public_profile(&UserId::random())
            .await
            .expect_err("user missing");

        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn connection_failure_is_service_unavailable() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id()
            .return_once(|_| Err(UserRepositoryError::connection("pool exhausted")));

        let error = service(repo, MockChangePublisher::new())
            .current_user(&UserId::random())
            .await
            .expect_err("store down");

        assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    }
}
