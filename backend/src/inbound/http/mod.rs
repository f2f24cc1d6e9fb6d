//! HTTP inbound adapter exposing the REST API.
//!
//! Handlers translate requests into driving-port calls and map
//! [`crate::domain::Error`] onto responses. [`configure_api`] registers every
//! `/api/v1` route so the server and the tests mount the same surface.

pub mod applications;
pub mod auth;
pub mod error;
pub mod health;
pub mod messages;
pub mod notifications;
pub mod pets;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

use actix_web::web;

use crate::domain::Error;

pub use error::ApiResult;

/// JSON extractor settings: malformed bodies become `invalid_request`.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(|err, _req| Error::invalid_request(err.to_string()).into())
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| Error::invalid_request(err.to_string()).into())
}

/// Register the API routes on a scope mounted at `/api/v1`.
///
/// The caller wraps the scope with session middleware. `/users/me/...`
/// routes are registered before `/users/{id}` so the literal segment wins.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use adoption_backend::inbound::http::configure_api;
///
/// let app = App::new().service(web::scope("/api/v1").configure(configure_api));
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .service(auth::create_session)
        .service(auth::end_session)
        .service(users::current_user)
        .service(users::update_profile)
        .service(users::delete_account)
        .service(pets::recommendations)
        .service(applications::sent_applications)
        .service(applications::received_applications)
        .service(notifications::list_notifications)
        .service(notifications::unread_count)
        .service(users::get_user)
        .service(pets::list_owner_pets)
        .service(pets::create_pet)
        .service(pets::list_pets)
        .service(pets::get_pet)
        .service(pets::update_pet)
        .service(pets::delete_pet)
        .service(applications::submit_application)
        .service(applications::my_application_for_pet)
        .service(applications::get_application)
        .service(applications::decide_application)
        .service(messages::send_message)
        .service(messages::list_messages)
        .service(notifications::mark_read);
}
