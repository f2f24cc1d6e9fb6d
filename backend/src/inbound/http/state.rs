//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only see the driving ports,
//! so they can be exercised against mocks without any storage.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    ApplicationCommand, ApplicationQuery, ApplicationRepository, ChangePublisher, MessageCommand,
    MessageQuery, MessageRepository, NotificationCommand, NotificationQuery,
    NotificationRepository, PetCommand, PetQuery, PetRepository, UserCommand, UserQuery,
    UserRepository,
};
use crate::domain::{
    AdoptionPolicy, ApplicationService, MessagingService, NotificationService, PetService,
    UserService,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub user_command: Arc<dyn UserCommand>,
    pub users: Arc<dyn UserQuery>,
    pub pet_command: Arc<dyn PetCommand>,
    pub pets: Arc<dyn PetQuery>,
    pub application_command: Arc<dyn ApplicationCommand>,
    pub applications: Arc<dyn ApplicationQuery>,
    pub message_command: Arc<dyn MessageCommand>,
    pub messages: Arc<dyn MessageQuery>,
    pub notification_command: Arc<dyn NotificationCommand>,
    pub notifications: Arc<dyn NotificationQuery>,
}

/// Driven-port adapters the domain services are built over.
pub struct Repositories<U, P, A, M, N> {
    pub users: Arc<U>,
    pub pets: Arc<P>,
    pub applications: Arc<A>,
    pub messages: Arc<M>,
    pub notifications: Arc<N>,
}

impl<S> Repositories<S, S, S, S, S> {
    /// Use one store for every repository port.
    pub fn shared(store: Arc<S>) -> Self {
        Self {
            users: store.clone(),
            pets: store.clone(),
            applications: store.clone(),
            messages: store.clone(),
            notifications: store,
        }
    }
}

/// Collaborators shared by every domain service.
#[derive(Clone)]
pub struct ServiceContext {
    pub clock: Arc<dyn Clock>,
    pub changes: Arc<dyn ChangePublisher>,
    pub policy: AdoptionPolicy,
}

impl HttpState {
    /// Build every domain service over `repos` and expose them as ports.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use adoption_backend::domain::AdoptionPolicy;
    /// use adoption_backend::domain::ports::NoopChangePublisher;
    /// use adoption_backend::inbound::http::state::{HttpState, Repositories, ServiceContext};
    /// use adoption_backend::outbound::memory::MemoryStore;
    ///
    /// let state = HttpState::from_repositories(
    ///     Repositories::shared(Arc::new(MemoryStore::new())),
    ///     ServiceContext {
    ///         clock: Arc::new(mockable::DefaultClock),
    ///         changes: Arc::new(NoopChangePublisher),
    ///         policy: AdoptionPolicy::default(),
    ///     },
    /// );
    /// # let _ = state;
    /// ```
    pub fn from_repositories<U, P, A, M, N>(
        repos: Repositories<U, P, A, M, N>,
        context: ServiceContext,
    ) -> Self
    where
        U: UserRepository + 'static,
        P: PetRepository + 'static,
        A: ApplicationRepository + 'static,
        M: MessageRepository + 'static,
        N: NotificationRepository + 'static,
    {
        let ServiceContext {
            clock,
            changes,
            policy,
        } = context;
        let users = Arc::new(UserService::new(
            repos.users.clone(),
            clock.clone(),
            changes.clone(),
        ));
        let pets = Arc::new(PetService::new(
            repos.pets.clone(),
            repos.users.clone(),
            clock.clone(),
            changes.clone(),
        ));
        let applications = Arc::new(ApplicationService::new(
            repos.applications.clone(),
            repos.pets,
            repos.users.clone(),
            clock.clone(),
            changes.clone(),
            policy,
        ));
        let messages = Arc::new(MessagingService::new(
            repos.applications,
            repos.messages,
            repos.users,
            clock.clone(),
            changes.clone(),
            policy,
        ));
        let notifications = Arc::new(NotificationService::new(
            repos.notifications,
            clock,
            changes,
        ));
        Self {
            user_command: users.clone(),
            users,
            pet_command: pets.clone(),
            pets,
            application_command: applications.clone(),
            applications,
            message_command: messages.clone(),
            messages,
            notification_command: notifications.clone(),
            notifications,
        }
    }
}
