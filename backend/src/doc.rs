//! OpenAPI documentation for the REST API.
//!
//! [`ApiDoc`] registers every `/api/v1` handler, the health probes, the
//! request and response schemas, and the session cookie security scheme.
//! Swagger UI serves it in debug builds; `cargo run --bin openapi-dump`
//! prints it for client generation.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{
    ActivityLevel, AdopterPreferences, AgeGroup, Application, ApplicationStatus, Error, ErrorCode,
    Experience, Gender, LivingSpace, Message, Notification, NotificationKind, Pet,
    PublicProfile, Questionnaire, Size, Species, User,
};
use crate::inbound::http::applications::StatusRequest;
use crate::inbound::http::auth::SessionRequest;
use crate::inbound::http::messages::MessageRequest;
use crate::inbound::http::notifications::UnreadCount;
use crate::inbound::http::pets::PetRequest;
use crate::inbound::http::users::ProfileRequest;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/session.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Pet adoption backend API",
        description = "Listings, adoption applications, messaging and notifications. \
            Live updates are pushed over the `/ws` change feed."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::create_session,
        crate::inbound::http::auth::end_session,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::update_profile,
        crate::inbound::http::users::delete_account,
        crate::inbound::http::users::get_user,
        crate::inbound::http::pets::create_pet,
        crate::inbound::http::pets::list_pets,
        crate::inbound::http::pets::get_pet,
        crate::inbound::http::pets::update_pet,
        crate::inbound::http::pets::delete_pet,
        crate::inbound::http::pets::list_owner_pets,
        crate::inbound::http::pets::recommendations,
        crate::inbound::http::applications::submit_application,
        crate::inbound::http::applications::my_application_for_pet,
        crate::inbound::http::applications::get_application,
        crate::inbound::http::applications::decide_application,
        crate::inbound::http::applications::sent_applications,
        crate::inbound::http::applications::received_applications,
        crate::inbound::http::messages::send_message,
        crate::inbound::http::messages::list_messages,
        crate::inbound::http::notifications::list_notifications,
        crate::inbound::http::notifications::unread_count,
        crate::inbound::http::notifications::mark_read,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        User,
        PublicProfile,
        AdopterPreferences,
        Pet,
        Species,
        Size,
        Gender,
        ActivityLevel,
        AgeGroup,
        LivingSpace,
        Experience,
        Application,
        ApplicationStatus,
        Questionnaire,
        Message,
        Notification,
        NotificationKind,
        SessionRequest,
        ProfileRequest,
        PetRequest,
        StatusRequest,
        MessageRequest,
        UnreadCount,
    )),
    tags(
        (name = "session", description = "Sign-in and sign-out"),
        (name = "users", description = "Profiles and adopter preferences"),
        (name = "pets", description = "Pet listings and recommendations"),
        (name = "applications", description = "Adoption applications"),
        (name = "messages", description = "Per-application transcripts"),
        (name = "notifications", description = "In-app notifications"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case("Error", "code")]
    #[case("Error", "message")]
    #[case("Pet", "ownerId")]
    #[case("Application", "status")]
    #[case("Notification", "isRead")]
    fn schemas_expose_their_fields(#[case] name: &str, #[case] field: &str) {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let schema = schemas
            .get(name)
            .unwrap_or_else(|| panic!("{name} schema registered"));
        assert_object_schema_has_field(schema, field);
    }

    #[rstest]
    #[case("/api/v1/session")]
    #[case("/api/v1/pets/{id}/applications")]
    #[case("/api/v1/applications/{id}/status")]
    #[case("/api/v1/applications/{id}/messages")]
    #[case("/api/v1/notifications/{id}/read")]
    #[case("/health/ready")]
    fn paths_are_documented(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "{path} missing");
    }

    #[rstest]
    fn session_cookie_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("SessionCookie"));
    }
}
