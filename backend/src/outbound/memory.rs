//! In-memory store implementing every repository port.
//!
//! Used when no database is configured and by the integration tests. All
//! tables live behind one `RwLock`, so each port call observes and mutates a
//! consistent snapshot and the multi-row writes are atomic.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::notification::newest_first;
use crate::domain::ports::{
    ApplicationRepository, ApplicationRepositoryError, MessageRepository, MessageRepositoryError,
    NotificationRepository, NotificationRepositoryError, PetRepository, PetRepositoryError,
    UserRepository, UserRepositoryError,
};
use crate::domain::{
    Application, ApplicationId, ApplicationStatus, Message, Notification, NotificationId, Pet,
    PetId, SubjectId, User, UserId,
};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<UserId, User>,
    pets: HashMap<PetId, Pet>,
    applications: HashMap<ApplicationId, Application>,
    messages: Vec<Message>,
    notifications: HashMap<NotificationId, Notification>,
}

impl Tables {
    fn insert_notification(&mut self, notification: &Notification) {
        self.notifications
            .insert(notification.id, notification.clone());
    }
}

/// Process-local store. Cloning shares the underlying tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn oldest_first_pets(pets: &mut [Pet]) {
    pets.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
}

fn newest_first_applications(applications: &mut [Application]) {
    applications.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        Ok(self.tables.read().await.users.get(id).cloned())
    }

    async fn find_by_subject(
        &self,
        subject: &SubjectId,
    ) -> Result<Option<User>, UserRepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|user| user.subject == *subject)
            .cloned())
    }

    async fn upsert_by_subject(&self, candidate: &User) -> Result<User, UserRepositoryError> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables
            .users
            .values_mut()
            .find(|user| user.subject == candidate.subject)
        {
            existing.name.clone_from(&candidate.name);
            existing.email.clone_from(&candidate.email);
            return Ok(existing.clone());
        }
        tables.users.insert(candidate.id, candidate.clone());
        Ok(candidate.clone())
    }

    async fn update_profile(&self, user: &User) -> Result<bool, UserRepositoryError> {
        let mut tables = self.tables.write().await;
        let Some(stored) = tables.users.get_mut(&user.id) else {
            return Ok(false);
        };
        stored.name.clone_from(&user.name);
        stored.phone.clone_from(&user.phone);
        stored.location.clone_from(&user.location);
        stored.bio.clone_from(&user.bio);
        stored.preferences.clone_from(&user.preferences);
        Ok(true)
    }

    async fn delete(
        &self,
        id: &UserId,
        at: DateTime<Utc>,
    ) -> Result<Option<Vec<Pet>>, UserRepositoryError> {
        let mut tables = self.tables.write().await;
        if tables.users.remove(id).is_none() {
            return Ok(None);
        }
        let mut removed: Vec<Pet> = tables
            .pets
            .values_mut()
            .filter(|pet| pet.owner_id == *id && !pet.is_removed)
            .map(|pet| {
                pet.is_removed = true;
                pet.updated_at = at;
                pet.clone()
            })
            .collect();
        oldest_first_pets(&mut removed);
        tables
            .notifications
            .retain(|_, notification| notification.user_id != *id);
        Ok(Some(removed))
    }
}

#[async_trait]
impl PetRepository for MemoryStore {
    async fn insert(&self, pet: &Pet) -> Result<(), PetRepositoryError> {
        let mut tables = self.tables.write().await;
        if tables.pets.contains_key(&pet.id) {
            return Err(PetRepositoryError::query(format!("pet {} already exists", pet.id)));
        }
        tables.pets.insert(pet.id, pet.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &PetId) -> Result<Option<Pet>, PetRepositoryError> {
        Ok(self.tables.read().await.pets.get(id).cloned())
    }

    async fn update(&self, pet: &Pet) -> Result<bool, PetRepositoryError> {
        let mut tables = self.tables.write().await;
        let Some(stored) = tables.pets.get_mut(&pet.id).filter(|stored| !stored.is_removed) else {
            return Ok(false);
        };
        let owner_id = stored.owner_id;
        *stored = Pet {
            owner_id,
            is_removed: false,
            ..pet.clone()
        };
        Ok(true)
    }

    async fn remove(&self, id: &PetId, at: DateTime<Utc>) -> Result<bool, PetRepositoryError> {
        let mut tables = self.tables.write().await;
        let Some(stored) = tables.pets.get_mut(id).filter(|stored| !stored.is_removed) else {
            return Ok(false);
        };
        stored.is_removed = true;
        stored.updated_at = at;
        Ok(true)
    }

    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<Pet>, PetRepositoryError> {
        let tables = self.tables.read().await;
        let mut pets: Vec<Pet> = tables
            .pets
            .values()
            .filter(|pet| pet.owner_id == *owner && !pet.is_removed)
            .cloned()
            .collect();
        oldest_first_pets(&mut pets);
        Ok(pets)
    }

    async fn list_available(&self) -> Result<Vec<Pet>, PetRepositoryError> {
        let tables = self.tables.read().await;
        let mut pets: Vec<Pet> = tables
            .pets
            .values()
            .filter(|pet| pet.is_available && !pet.is_removed)
            .cloned()
            .collect();
        oldest_first_pets(&mut pets);
        Ok(pets)
    }
}

#[async_trait]
impl ApplicationRepository for MemoryStore {
    async fn create_with_notification(
        &self,
        application: &Application,
        notification: &Notification,
    ) -> Result<(), ApplicationRepositoryError> {
        let mut tables = self.tables.write().await;
        let duplicate = tables.applications.values().any(|existing| {
            existing.pet_id == application.pet_id
                && existing.applicant_id == application.applicant_id
                && existing.status.is_active()
        });
        if duplicate {
            return Err(ApplicationRepositoryError::duplicate_active());
        }
        tables
            .applications
            .insert(application.id, application.clone());
        tables.insert_notification(notification);
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<Application>, ApplicationRepositoryError> {
        Ok(self.tables.read().await.applications.get(id).cloned())
    }

    async fn list_for_pet_and_applicant(
        &self,
        pet: &PetId,
        applicant: &UserId,
    ) -> Result<Vec<Application>, ApplicationRepositoryError> {
        let tables = self.tables.read().await;
        let mut history: Vec<Application> = tables
            .applications
            .values()
            .filter(|application| {
                application.pet_id == *pet && application.applicant_id == *applicant
            })
            .cloned()
            .collect();
        history.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(history)
    }

    async fn list_by_applicant(
        &self,
        applicant: &UserId,
    ) -> Result<Vec<Application>, ApplicationRepositoryError> {
        let tables = self.tables.read().await;
        let mut sent: Vec<Application> = tables
            .applications
            .values()
            .filter(|application| application.applicant_id == *applicant)
            .cloned()
            .collect();
        newest_first_applications(&mut sent);
        Ok(sent)
    }

    async fn list_by_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<Application>, ApplicationRepositoryError> {
        let tables = self.tables.read().await;
        let mut received: Vec<Application> = tables
            .applications
            .values()
            .filter(|application| application.owner_id == *owner)
            .cloned()
            .collect();
        newest_first_applications(&mut received);
        Ok(received)
    }

    async fn decide_with_notification(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
        decided_at: DateTime<Utc>,
        notification: &Notification,
    ) -> Result<Application, ApplicationRepositoryError> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .applications
            .get_mut(id)
            .ok_or_else(ApplicationRepositoryError::not_found)?;
        if stored.status != ApplicationStatus::Pending {
            return Err(ApplicationRepositoryError::stale_state());
        }
        stored.status = status;
        stored.decided_at = Some(decided_at);
        let decided = stored.clone();
        tables.insert_notification(notification);
        Ok(decided)
    }
}

#[async_trait]
impl MessageRepository for MemoryStore {
    async fn append_with_notification(
        &self,
        message: &Message,
        notification: &Notification,
    ) -> Result<(), MessageRepositoryError> {
        let mut tables = self.tables.write().await;
        tables.messages.push(message.clone());
        tables.insert_notification(notification);
        Ok(())
    }

    async fn list_for_application(
        &self,
        application: &ApplicationId,
    ) -> Result<Vec<Message>, MessageRepositoryError> {
        let tables = self.tables.read().await;
        let mut transcript: Vec<Message> = tables
            .messages
            .iter()
            .filter(|message| message.application_id == *application)
            .cloned()
            .collect();
        // Stable: messages stamped with the same instant keep append order.
        transcript.sort_by_key(|message| message.created_at);
        Ok(transcript)
    }
}

#[async_trait]
impl NotificationRepository for MemoryStore {
    async fn insert(&self, notification: &Notification) -> Result<(), NotificationRepositoryError> {
        self.tables.write().await.insert_notification(notification);
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &NotificationId,
    ) -> Result<Option<Notification>, NotificationRepositoryError> {
        Ok(self.tables.read().await.notifications.get(id).cloned())
    }

    async fn mark_read(&self, id: &NotificationId) -> Result<bool, NotificationRepositoryError> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .notifications
            .get_mut(id)
            .is_some_and(Notification::mark_read))
    }

    async fn list_for_user(
        &self,
        user: &UserId,
    ) -> Result<Vec<Notification>, NotificationRepositoryError> {
        let tables = self.tables.read().await;
        let mut feed: Vec<Notification> = tables
            .notifications
            .values()
            .filter(|notification| notification.user_id == *user)
            .cloned()
            .collect();
        feed.sort_by(newest_first);
        Ok(feed)
    }

    async fn unread_count(&self, user: &UserId) -> Result<u64, NotificationRepositoryError> {
        let tables = self.tables.read().await;
        let unread = tables
            .notifications
            .values()
            .filter(|notification| notification.user_id == *user && !notification.is_read)
            .count();
        Ok(unread as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pet::fixtures::{dog_draft, pet_from};
    use crate::domain::{
        IdentityClaims, MessageId, NotificationDraft, NotificationKind, Questionnaire,
    };
    use chrono::{Duration, TimeZone};
    use rstest::{fixture, rstest};

    #[fixture]
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0)
            .single()
            .expect("fixture timestamp")
    }

    fn user(subject: &str, now: DateTime<Utc>) -> User {
        let claims = IdentityClaims::try_new(subject, "Rowan", &format!("{subject}@example.com"))
            .expect("claims");
        User::from_claims(UserId::random(), claims, now)
    }

    fn notification_for(user: UserId, at: DateTime<Utc>) -> Notification {
        let draft = NotificationDraft::try_new(
            user,
            NotificationKind::Message,
            "New message",
            "You have a new message",
            None,
        )
        .expect("draft");
        Notification::from_draft(NotificationId::random(), draft, at)
    }

    fn pending(pet: &Pet, applicant: UserId, at: DateTime<Utc>) -> Application {
        let questionnaire = Questionnaire {
            reason: "Big garden".into(),
            other_pets: "None".into(),
            ..Questionnaire::default()
        };
        Application::submit(ApplicationId::random(), pet, applicant, questionnaire, at)
    }

    #[rstest]
    #[tokio::test]
    async fn upsert_keeps_the_first_id_and_refreshes_identity(now: DateTime<Utc>) {
        let store = MemoryStore::new();
        let first = user("sub-1", now);
        store.upsert_by_subject(&first).await.expect("insert");

        let mut again = user("sub-1", now);
        again.name = "Rowan Ash".into();
        let stored = store.upsert_by_subject(&again).await.expect("upsert");

        assert_eq!(stored.id, first.id);
        assert_eq!(stored.name, "Rowan Ash");
        assert!(
            UserRepository::find_by_id(&store, &again.id)
                .await
                .expect("lookup")
                .is_none()
        );
    }

    #[rstest]
    #[tokio::test]
    async fn deleting_a_user_closes_their_footprint(now: DateTime<Utc>) {
        let store = MemoryStore::new();
        let owner = store
            .upsert_by_subject(&user("sub-owner", now))
            .await
            .expect("owner");
        let applicant = UserId::random();
        let listed = pet_from(owner.id, dog_draft(), now);
        let mut already_gone = pet_from(owner.id, dog_draft(), now);
        already_gone.is_removed = true;
        for pet in [&listed, &already_gone] {
            PetRepository::insert(&store, pet).await.expect("insert");
        }
        let application = pending(&listed, applicant, now);
        store
            .create_with_notification(&application, &notification_for(owner.id, now))
            .await
            .expect("application");
        store
            .tables
            .write()
            .await
            .insert_notification(&notification_for(applicant, now));

        let later = now + Duration::hours(1);
        let removed = store
            .delete(&owner.id, later)
            .await
            .expect("delete")
            .expect("user existed");

        assert_eq!(removed.iter().map(|pet| pet.id).collect::<Vec<_>>(), vec![listed.id]);
        assert!(removed.iter().all(|pet| pet.is_removed && pet.updated_at == later));
        assert!(store.list_available().await.expect("available").is_empty());
        let tables = store.tables.read().await;
        assert!(tables.applications.contains_key(&application.id));
        assert!(tables.notifications.values().all(|n| n.user_id == applicant));
        assert_eq!(tables.notifications.len(), 1);
        drop(tables);

        assert!(store.delete(&owner.id, later).await.expect("again").is_none());
        assert!(
            store
                .find_by_subject(&owner.subject)
                .await
                .expect("lookup")
                .is_none()
        );
        let returning = store
            .upsert_by_subject(&user("sub-owner", later))
            .await
            .expect("sign in again");
        assert_ne!(returning.id, owner.id);
    }

    #[rstest]
    #[tokio::test]
    async fn removed_and_unavailable_pets_leave_listings(now: DateTime<Utc>) {
        let store = MemoryStore::new();
        let owner = UserId::random();
        let listed = pet_from(owner, dog_draft(), now);
        let mut removed = pet_from(owner, dog_draft(), now + Duration::minutes(1));
        removed.is_removed = true;
        let mut adopted = pet_from(owner, dog_draft(), now + Duration::minutes(2));
        adopted.is_available = false;
        for pet in [&listed, &removed, &adopted] {
            PetRepository::insert(&store, pet).await.expect("insert");
        }

        let available = store.list_available().await.expect("available");
        assert_eq!(available, vec![listed.clone()]);
        let owned = PetRepository::list_by_owner(&store, &owner)
            .await
            .expect("owned");
        assert_eq!(owned, vec![listed, adopted]);
    }

    #[rstest]
    #[tokio::test]
    async fn pet_updates_never_change_the_owner(now: DateTime<Utc>) {
        let store = MemoryStore::new();
        let owner = UserId::random();
        let pet = pet_from(owner, dog_draft(), now);
        PetRepository::insert(&store, &pet).await.expect("insert");

        let mut hijacked = pet.clone();
        hijacked.owner_id = UserId::random();
        hijacked.name = "Biscuit".into();
        assert!(store.update(&hijacked).await.expect("update"));

        let stored = PetRepository::find_by_id(&store, &pet.id)
            .await
            .expect("lookup")
            .expect("stored");
        assert_eq!(stored.owner_id, owner);
        assert_eq!(stored.name, "Biscuit");
    }

    #[rstest]
    #[tokio::test]
    async fn stale_edits_cannot_restore_a_removed_pet(now: DateTime<Utc>) {
        let store = MemoryStore::new();
        let pet = pet_from(UserId::random(), dog_draft(), now);
        PetRepository::insert(&store, &pet).await.expect("insert");
        let mut stale_edit = pet.clone();
        stale_edit.name = "Biscuit".into();

        let later = now + Duration::minutes(5);
        assert!(store.remove(&pet.id, later).await.expect("remove"));
        assert!(!store.remove(&pet.id, later).await.expect("second remove"));
        assert!(!store.update(&stale_edit).await.expect("stale update"));

        let stored = PetRepository::find_by_id(&store, &pet.id)
            .await
            .expect("lookup")
            .expect("stored");
        assert!(stored.is_removed);
        assert_eq!(stored.name, pet.name);
        assert_eq!(stored.updated_at, later);
        assert!(store.list_available().await.expect("available").is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn second_active_application_is_refused(now: DateTime<Utc>) {
        let store = MemoryStore::new();
        let pet = pet_from(UserId::random(), dog_draft(), now);
        let applicant = UserId::random();
        let first = pending(&pet, applicant, now);
        store
            .create_with_notification(&first, &notification_for(pet.owner_id, now))
            .await
            .expect("first application");

        let second = pending(&pet, applicant, now + Duration::seconds(1));
        let err = store
            .create_with_notification(&second, &notification_for(pet.owner_id, now))
            .await
            .expect_err("duplicate");
        assert_eq!(err, ApplicationRepositoryError::duplicate_active());
        assert_eq!(
            NotificationRepository::unread_count(&store, &pet.owner_id)
                .await
                .expect("count"),
            1
        );
    }

    #[rstest]
    #[tokio::test]
    async fn decisions_only_apply_while_pending(now: DateTime<Utc>) {
        let store = MemoryStore::new();
        let pet = pet_from(UserId::random(), dog_draft(), now);
        let application = pending(&pet, UserId::random(), now);
        store
            .create_with_notification(&application, &notification_for(pet.owner_id, now))
            .await
            .expect("create");

        let decided = store
            .decide_with_notification(
                &application.id,
                ApplicationStatus::Accepted,
                now,
                &notification_for(application.applicant_id, now),
            )
            .await
            .expect("decide");
        assert_eq!(decided.status, ApplicationStatus::Accepted);
        assert_eq!(decided.decided_at, Some(now));

        let err = store
            .decide_with_notification(
                &application.id,
                ApplicationStatus::Rejected,
                now,
                &notification_for(application.applicant_id, now),
            )
            .await
            .expect_err("stale");
        assert_eq!(err, ApplicationRepositoryError::stale_state());
        assert_eq!(
            NotificationRepository::unread_count(&store, &application.applicant_id)
                .await
                .expect("count"),
            1
        );
    }

    #[rstest]
    #[tokio::test]
    async fn deciding_an_unknown_application_is_not_found(now: DateTime<Utc>) {
        let store = MemoryStore::new();
        let err = store
            .decide_with_notification(
                &ApplicationId::random(),
                ApplicationStatus::Accepted,
                now,
                &notification_for(UserId::random(), now),
            )
            .await
            .expect_err("missing");
        assert_eq!(err, ApplicationRepositoryError::not_found());
    }

    #[rstest]
    #[tokio::test]
    async fn transcripts_are_ordered_by_time(now: DateTime<Utc>) {
        let store = MemoryStore::new();
        let application = ApplicationId::random();
        let (sender, receiver) = (UserId::random(), UserId::random());
        let message = |at: DateTime<Utc>| Message {
            id: MessageId::random(),
            application_id: application,
            sender_id: sender,
            receiver_id: receiver,
            content: "hello".into(),
            created_at: at,
        };
        let later = message(now + Duration::seconds(5));
        let earlier = message(now);
        for entry in [&later, &earlier] {
            store
                .append_with_notification(entry, &notification_for(receiver, entry.created_at))
                .await
                .expect("append");
        }

        let transcript = store
            .list_for_application(&application)
            .await
            .expect("transcript");
        assert_eq!(transcript, vec![earlier, later]);
    }

    #[rstest]
    #[tokio::test]
    async fn same_instant_messages_keep_send_order(now: DateTime<Utc>) {
        let store = MemoryStore::new();
        let application = ApplicationId::random();
        let (sender, receiver) = (UserId::random(), UserId::random());
        let sent: Vec<Message> = (0..20)
            .map(|n| Message {
                id: MessageId::random(),
                application_id: application,
                sender_id: sender,
                receiver_id: receiver,
                content: format!("msg {n}"),
                created_at: now,
            })
            .collect();
        for message in &sent {
            store
                .append_with_notification(message, &notification_for(receiver, now))
                .await
                .expect("append");
        }

        let transcript = store
            .list_for_application(&application)
            .await
            .expect("transcript");
        assert_eq!(transcript, sent);
    }

    #[rstest]
    #[tokio::test]
    async fn mark_read_reports_only_the_first_flip(now: DateTime<Utc>) {
        let store = MemoryStore::new();
        let notification = notification_for(UserId::random(), now);
        NotificationRepository::insert(&store, &notification)
            .await
            .expect("insert");

        assert!(store.mark_read(&notification.id).await.expect("first"));
        assert!(!store.mark_read(&notification.id).await.expect("second"));
        assert!(
            !store
                .mark_read(&NotificationId::random())
                .await
                .expect("unknown")
        );
        assert_eq!(
            NotificationRepository::unread_count(&store, &notification.user_id)
                .await
                .expect("count"),
            0
        );
    }

    #[rstest]
    #[tokio::test]
    async fn notification_feed_is_newest_first(now: DateTime<Utc>) {
        let store = MemoryStore::new();
        let user = UserId::random();
        let older = notification_for(user, now);
        let newer = notification_for(user, now + Duration::minutes(1));
        for notification in [&older, &newer, &notification_for(UserId::random(), now)] {
            NotificationRepository::insert(&store, notification)
                .await
                .expect("insert");
        }

        let feed = store.list_for_user(&user).await.expect("feed");
        assert_eq!(feed, vec![newer, older]);
    }
}
