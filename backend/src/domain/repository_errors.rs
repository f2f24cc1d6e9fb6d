//! Translation of driven-port failures into domain errors.
//!
//! Connection failures become `service_unavailable`; everything else a
//! repository reports unexpectedly becomes `internal_error`, which the HTTP
//! layer redacts.

use serde_json::json;

use super::Error;
use super::ports::{
    ApplicationRepositoryError, MessageRepositoryError, NotificationRepositoryError,
    PetRepositoryError, UserRepositoryError,
};

pub(crate) fn map_user_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
    }
}

pub(crate) fn map_pet_error(error: PetRepositoryError) -> Error {
    match error {
        PetRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("pet repository unavailable: {message}"))
        }
        PetRepositoryError::Query { message } => {
            Error::internal(format!("pet repository error: {message}"))
        }
    }
}

pub(crate) fn map_application_error(error: ApplicationRepositoryError) -> Error {
    match error {
        ApplicationRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("application repository unavailable: {message}"))
        }
        ApplicationRepositoryError::Query { message } => {
            Error::internal(format!("application repository error: {message}"))
        }
        ApplicationRepositoryError::DuplicateActive => duplicate_application(),
        ApplicationRepositoryError::StaleState => {
            Error::invalid_state("application was decided by another request")
                .with_details(json!({ "reason": "stale_state" }))
        }
        ApplicationRepositoryError::NotFound => Error::not_found("application not found"),
    }
}

pub(crate) fn map_message_error(error: MessageRepositoryError) -> Error {
    match error {
        MessageRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("message repository unavailable: {message}"))
        }
        MessageRepositoryError::Query { message } => {
            Error::internal(format!("message repository error: {message}"))
        }
    }
}

pub(crate) fn map_notification_error(error: NotificationRepositoryError) -> Error {
    match error {
        NotificationRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("notification repository unavailable: {message}"))
        }
        NotificationRepositoryError::Query { message } => {
            Error::internal(format!("notification repository error: {message}"))
        }
    }
}

pub(crate) fn duplicate_application() -> Error {
    Error::invalid_state("an active application already exists for this pet")
        .with_details(json!({ "reason": "duplicate_application" }))
}
