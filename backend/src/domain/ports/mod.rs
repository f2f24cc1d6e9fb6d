//! Domain ports defining the edges of the hexagon.
//!
//! Driven ports (repositories, the change publisher and feed) describe what
//! the domain needs from outbound adapters and expose typed errors. Driving
//! ports (`*Command`, `*Query`) are what inbound adapters call; they speak
//! [`crate::domain::Error`].

mod macros;
pub(crate) use macros::define_port_error;

mod application_command;
mod application_query;
mod application_repository;
mod change_feed;
mod change_publisher;
mod message_command;
mod message_query;
mod message_repository;
mod notification_command;
mod notification_query;
mod notification_repository;
mod pet_command;
mod pet_query;
mod pet_repository;
mod user_command;
mod user_query;
mod user_repository;

#[cfg(test)]
pub use application_command::MockApplicationCommand;
pub use application_command::ApplicationCommand;
#[cfg(test)]
pub use application_query::MockApplicationQuery;
pub use application_query::ApplicationQuery;
#[cfg(test)]
pub use application_repository::MockApplicationRepository;
pub use application_repository::{ApplicationRepository, ApplicationRepositoryError};
#[cfg(test)]
pub use change_feed::MockChangeStream;
pub use change_feed::{ChangeFeed, ChangeStream, FeedItem};
#[cfg(test)]
pub use change_publisher::MockChangePublisher;
pub use change_publisher::{ChangePublisher, NoopChangePublisher};
#[cfg(test)]
pub use message_command::MockMessageCommand;
pub use message_command::{MessageCommand, SendMessageRequest};
#[cfg(test)]
pub use message_query::MockMessageQuery;
pub use message_query::MessageQuery;
#[cfg(test)]
pub use message_repository::MockMessageRepository;
pub use message_repository::{MessageRepository, MessageRepositoryError};
#[cfg(test)]
pub use notification_command::MockNotificationCommand;
pub use notification_command::NotificationCommand;
#[cfg(test)]
pub use notification_query::MockNotificationQuery;
pub use notification_query::NotificationQuery;
#[cfg(test)]
pub use notification_repository::MockNotificationRepository;
pub use notification_repository::{NotificationRepository, NotificationRepositoryError};
#[cfg(test)]
pub use pet_command::MockPetCommand;
pub use pet_command::PetCommand;
#[cfg(test)]
pub use pet_query::MockPetQuery;
pub use pet_query::PetQuery;
#[cfg(test)]
pub use pet_repository::MockPetRepository;
pub use pet_repository::{PetRepository, PetRepositoryError};
#[cfg(test)]
pub use user_command::MockUserCommand;
pub use user_command::UserCommand;
#[cfg(test)]
pub use user_query::MockUserQuery;
pub use user_query::UserQuery;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserRepository, UserRepositoryError};
