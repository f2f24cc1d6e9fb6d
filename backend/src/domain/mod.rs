//! Domain entities, rules and services for the adoption marketplace.
//!
//! Purpose: keep every business rule (validation, access control, the
//! application lifecycle, recommendation matching) transport agnostic.
//! Inbound adapters call the services through the driving ports in
//! [`ports`]; outbound adapters implement the driven ports.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - User, Pet, Application, Message, Notification: the stored entities.
//! - `*Service`: implementations of the driving ports.

pub mod access;
pub mod application;
mod application_service;
pub mod error;
pub mod events;
pub mod ids;
pub mod message;
mod messaging_service;
pub mod notification;
mod notification_service;
pub mod pet;
mod pet_service;
pub mod policy;
pub mod ports;
pub mod preferences;
pub mod recommendation;
mod repository_errors;
#[cfg(test)]
mod test_clock;
pub mod trace_id;
pub mod user;
mod user_service;
pub mod validation;
pub mod vocabulary;

pub use self::access::AccessDenied;
pub use self::application::{
    Application, ApplicationStatus, Decision, ParseApplicationStatusError, Questionnaire,
    TransitionError,
};
pub use self::application_service::ApplicationService;
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::events::{Audience, ChangeEvent, ChangeKind, EntityKind};
pub use self::ids::{
    ApplicationId, IdValidationError, MessageId, NotificationId, PetId, UserId,
};
pub use self::message::{MESSAGE_MAX_CHARS, Message, MessageContent};
pub use self::messaging_service::MessagingService;
pub use self::notification::{
    Notification, NotificationDraft, NotificationKind, ParseNotificationKindError,
};
pub use self::notification_service::NotificationService;
pub use self::pet::{Pet, PetAttributes, PetDraft};
pub use self::pet_service::PetService;
pub use self::policy::AdoptionPolicy;
pub use self::preferences::{AdopterPreferences, AdopterPreferencesBuilder};
pub use self::trace_id::TraceId;
pub use self::user::{
    IdentityClaims, ProfileDraft, ProfileUpdate, PublicProfile, SubjectId, User,
};
pub use self::user_service::UserService;
pub use self::validation::ValidationError;
pub use self::vocabulary::{
    ActivityLevel, AgeGroup, Experience, Gender, LivingSpace, ParseVocabularyError, Size, Species,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use adoption_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
