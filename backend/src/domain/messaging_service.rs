//! Messaging gate for application transcripts.
//!
//! Messages may only be sent on accepted applications, by one of its two
//! parties, to the other party. The receiver is always derived from the
//! application; a receiver named by the client is checked, never trusted.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;

use crate::domain::access::{ensure_can_message, ensure_can_read_transcript};
use crate::domain::ports::{
    ApplicationRepository, ChangePublisher, MessageCommand, MessageQuery, MessageRepository,
    SendMessageRequest, UserRepository,
};
use crate::domain::repository_errors::{map_application_error, map_message_error, map_user_error};
use crate::domain::{
    AdoptionPolicy, Application, ApplicationId, ChangeEvent, ChangeKind, Error, Message,
    MessageContent, MessageId, Notification, NotificationDraft, NotificationId, UserId,
};

/// Messaging service implementing the message driving ports.
#[derive(Clone)]
pub struct MessagingService<A, M, U> {
    applications: Arc<A>,
    messages: Arc<M>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
    changes: Arc<dyn ChangePublisher>,
    policy: AdoptionPolicy,
}

impl<A, M, U> MessagingService<A, M, U> {
    /// Create a new service.
    pub fn new(
        applications: Arc<A>,
        messages: Arc<M>,
        users: Arc<U>,
        clock: Arc<dyn Clock>,
        changes: Arc<dyn ChangePublisher>,
        policy: AdoptionPolicy,
    ) -> Self {
        Self {
            applications,
            messages,
            users,
            clock,
            changes,
            policy,
        }
    }
}

impl<A, M, U> MessagingService<A, M, U>
where
    A: ApplicationRepository,
    M: MessageRepository,
    U: UserRepository,
{
    async fn load(&self, id: &ApplicationId) -> Result<Application, Error> {
        self.applications
            .find_by_id(id)
            .await
            .map_err(map_application_error)?
            .ok_or_else(|| Error::not_found(format!("application {id} not found")))
    }

    async fn sender_name(&self, sender: &UserId) -> Result<String, Error> {
        self.users
            .find_by_id(sender)
            .await
            .map_err(map_user_error)?
            .map(|user| user.name)
            .ok_or_else(|| Error::not_found(format!("user {sender} not found")))
    }
}

fn mismatched_receiver() -> Error {
    Error::invalid_request("receiver must be the other party to the application")
        .with_details(json!({ "field": "receiverId", "code": "invalid" }))
}

#[async_trait]
impl<A, M, U> MessageCommand for MessagingService<A, M, U>
where
    A: ApplicationRepository,
    M: MessageRepository,
    U: UserRepository,
{
    async fn send(&self, request: SendMessageRequest) -> Result<Message, Error> {
        let SendMessageRequest {
            application_id,
            sender_id,
            receiver_id,
            content,
        } = request;

        let application = self.load(&application_id).await?;
        ensure_can_message(&application, &sender_id)?;
        let receiver = application
            .counterpart_of(&sender_id)
            .ok_or_else(|| Error::forbidden("only the two parties may exchange messages"))?;
        if receiver_id.is_some_and(|named| named != receiver) {
            return Err(mismatched_receiver());
        }
        let content = MessageContent::new(&content)?;

        let now = self.clock.utc();
        let message = Message {
            id: MessageId::random(),
            application_id,
            sender_id,
            receiver_id: receiver,
            content: content.into(),
            created_at: now,
        };
        let sender_name = self.sender_name(&sender_id).await?;
        let notification = Notification::from_draft(
            NotificationId::random(),
            NotificationDraft::new_message(&message, &sender_name),
            now,
        );
        self.messages
            .append_with_notification(&message, &notification)
            .await
            .map_err(map_message_error)?;

        self.changes.publish(ChangeEvent::message(&message));
        self.changes
            .publish(ChangeEvent::notification(&notification, ChangeKind::Created));
        Ok(message)
    }
}

#[async_trait]
impl<A, M, U> MessageQuery for MessagingService<A, M, U>
where
    A: ApplicationRepository,
    M: MessageRepository,
    U: UserRepository,
{
    async fn transcript(
        &self,
        application_id: &ApplicationId,
        caller: &UserId,
    ) -> Result<Vec<Message>, Error> {
        let application = self.load(application_id).await?;
        ensure_can_read_transcript(&application, caller, self.policy.restrict_transcript_reads)?;
        self.messages
            .list_for_application(application_id)
            .await
            .map_err(map_message_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pet::fixtures::{dog_draft, pet_from};
    use crate::domain::ports::{
        MockApplicationRepository, MockChangePublisher, MockMessageRepository, MockUserRepository,
    };
    use crate::domain::test_clock::{fixture_clock, fixture_timestamp};
    use crate::domain::{
        ApplicationStatus, ErrorCode, IdentityClaims, NotificationKind, Questionnaire, User,
    };
    use rstest::rstest;

    type Service =
        MessagingService<MockApplicationRepository, MockMessageRepository, MockUserRepository>;

    fn application(status: ApplicationStatus) -> Application {
        let pet = pet_from(UserId::random(), dog_draft(), fixture_timestamp());
        let mut application = Application::submit(
            ApplicationId::random(),
            &pet,
            UserId::random(),
            Questionnaire {
                reason: "Garden".to_owned(),
                other_pets: "None".to_owned(),
                ..Questionnaire::default()
            },
            fixture_timestamp(),
        );
        application.status = status;
        application
    }

    fn applications_returning(application: &Application) -> MockApplicationRepository {
        let stored = application.clone();
        let mut repo = MockApplicationRepository::new();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(stored.clone())));
        repo
    }

    fn users_named(name: &'static str) -> MockUserRepository {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(move |id| {
            let claims = IdentityClaims::try_new("user_x", name, "x@example.com").expect("claims");
            Ok(Some(User::from_claims(*id, claims, fixture_timestamp())))
        });
        users
    }

    fn service(
        applications: MockApplicationRepository,
        messages: MockMessageRepository,
        users: MockUserRepository,
        changes: MockChangePublisher,
        policy: AdoptionPolicy,
    ) -> Service {
        MessagingService::new(
            Arc::new(applications),
            Arc::new(messages),
            Arc::new(users),
            fixture_clock(),
            Arc::new(changes),
            policy,
        )
    }

    fn request(application: &Application, sender: UserId, content: &str) -> SendMessageRequest {
        SendMessageRequest {
            application_id: application.id,
            sender_id: sender,
            receiver_id: None,
            content: content.to_owned(),
        }
    }

    #[rstest]
    #[case::applicant_to_owner(true)]
    #[case::owner_to_applicant(false)]
    #[tokio::test]
    async fn either_party_may_message_on_accepted(#[case] from_applicant: bool) {
        let accepted = application(ApplicationStatus::Accepted);
        let (sender, receiver) = if from_applicant {
            (accepted.applicant_id, accepted.owner_id)
        } else {
            (accepted.owner_id, accepted.applicant_id)
        };
        let mut messages = MockMessageRepository::new();
        messages
            .expect_append_with_notification()
            .withf(move |message, notification| {
                message.receiver_id == receiver
                    && notification.user_id == receiver
                    && notification.kind == NotificationKind::Message
                    && notification.title == "New message from Dana"
            })
            .times(1)
            .returning(|_, _| Ok(()));
        let mut changes = MockChangePublisher::new();
        changes.expect_publish().times(2).return_const(());

        let message = service(
            applications_returning(&accepted),
            messages,
            users_named("Dana"),
            changes,
            AdoptionPolicy::default(),
        )
        .send(request(&accepted, sender, "  When can we meet?  "))
        .await
        .expect("message accepted");

        assert_eq!(message.content, "When can we meet?");
        assert_eq!(message.sender_id, sender);
    }

    #[rstest]
    #[tokio::test]
    async fn messages_require_accepted_application(
        #[values(ApplicationStatus::Pending, ApplicationStatus::Rejected)] status: ApplicationStatus,
        #[values(true, false)] from_applicant: bool,
    ) {
        let app = application(status);
        let sender = if from_applicant {
            app.applicant_id
        } else {
            app.owner_id
        };
        let mut messages = MockMessageRepository::new();
        messages.expect_append_with_notification().times(0);

        let error = service(
            applications_returning(&app),
            messages,
            MockUserRepository::new(),
            MockChangePublisher::new(),
            AdoptionPolicy::default(),
        )
        .send(request(&app, sender, "Hello"))
        .await
        .expect_err("not accepted");

        assert_eq!(error.code(), ErrorCode::InvalidState);
    }

    #[rstest]
    #[tokio::test]
    async fn strangers_cannot_message() {
        let accepted = application(ApplicationStatus::Accepted);

        let error = service(
            applications_returning(&accepted),
            MockMessageRepository::new(),
            MockUserRepository::new(),
            MockChangePublisher::new(),
            AdoptionPolicy::default(),
        )
        .send(request(&accepted, UserId::random(), "Hello"))
        .await
        .expect_err("stranger");

        assert_eq!(error.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn named_receiver_must_be_counterpart() {
        let accepted = application(ApplicationStatus::Accepted);
        let mut send = request(&accepted, accepted.applicant_id, "Hello");
        send.receiver_id = Some(UserId::random());

        let error = service(
            applications_returning(&accepted),
            MockMessageRepository::new(),
            MockUserRepository::new(),
            MockChangePublisher::new(),
            AdoptionPolicy::default(),
        )
        .send(send)
        .await
        .expect_err("wrong receiver");

        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn blank_content_is_invalid() {
        let accepted = application(ApplicationStatus::Accepted);

        let error = service(
            applications_returning(&accepted),
            MockMessageRepository::new(),
            MockUserRepository::new(),
            MockChangePublisher::new(),
            AdoptionPolicy::default(),
        )
        .send(request(&accepted, accepted.owner_id, " \n "))
        .await
        .expect_err("blank content");

        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn restricted_transcripts_hide_from_strangers() {
        let accepted = application(ApplicationStatus::Accepted);
        let mut messages = MockMessageRepository::new();
        messages.expect_list_for_application().times(0);

        let error = service(
            applications_returning(&accepted),
            messages,
            MockUserRepository::new(),
            MockChangePublisher::new(),
            AdoptionPolicy::default(),
        )
        .transcript(&accepted.id, &UserId::random())
        .await
        .expect_err("stranger");

        assert_eq!(error.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn open_transcripts_are_readable_by_anyone() {
        let accepted = application(ApplicationStatus::Accepted);
        let mut messages = MockMessageRepository::new();
        messages
            .expect_list_for_application()
            .times(1)
            .returning(|_| Ok(Vec::new()));
        let policy = AdoptionPolicy {
            restrict_transcript_reads: false,
            ..AdoptionPolicy::default()
        };

        let transcript = service(
            applications_returning(&accepted),
            messages,
            MockUserRepository::new(),
            MockChangePublisher::new(),
            policy,
        )
        .transcript(&accepted.id, &UserId::random())
        .await
        .expect("open policy");

        assert!(transcript.is_empty());
    }
}
