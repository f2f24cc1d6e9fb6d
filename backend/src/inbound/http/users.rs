//! User profile handlers.
//!
//! ```text
//! GET /api/v1/users/me
//! PUT /api/v1/users/me {"name":"Ada","location":"Leeds","preferences":{"species":["dog"]}}
//! DELETE /api/v1/users/me
//! GET /api/v1/users/{id}
//! ```

use actix_web::{HttpResponse, delete, get, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    AdopterPreferences, Error, ProfileDraft, ProfileUpdate, PublicProfile, User, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id};

/// Profile edit body for `PUT /api/v1/users/me`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    pub name: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    #[serde(default)]
    pub preferences: AdopterPreferences,
}

impl TryFrom<ProfileRequest> for ProfileUpdate {
    type Error = Error;

    fn try_from(value: ProfileRequest) -> Result<Self, Self::Error> {
        let ProfileRequest {
            name,
            phone,
            location,
            bio,
            preferences,
        } = value;
        let draft = ProfileDraft {
            name: &name,
            phone: phone.as_deref(),
            location: location.as_deref(),
            bio: bio.as_deref(),
            preferences,
        };
        Ok(Self::try_from_draft(draft)?)
    }
}

/// The signed-in user's full account.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<User>> {
    let user_id = session.require_user_id()?;
    let user = state.users.current_user(&user_id).await?;
    Ok(web::Json(user))
}

/// Replace profile fields and stored adopter preferences.
#[utoipa::path(
    put,
    path = "/api/v1/users/me",
    request_body = ProfileRequest,
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 400, description = "Invalid profile", body = Error),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateProfile"
)]
#[put("/users/me")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ProfileRequest>,
) -> ApiResult<web::Json<User>> {
    let user_id = session.require_user_id()?;
    let update = ProfileUpdate::try_from(payload.into_inner())?;
    let user = state.user_command.update_profile(&user_id, update).await?;
    Ok(web::Json(user))
}

/// Close the caller's account and end the session.
///
/// Their listings are removed; applications they took part in remain.
#[utoipa::path(
    delete,
    path = "/api/v1/users/me",
    responses(
        (status = 204, description = "Account closed and session ended"),
        (status = 401, description = "Not signed in", body = Error),
        (status = 404, description = "Account already closed", body = Error)
    ),
    tags = ["users"],
    operation_id = "deleteAccount"
)]
#[delete("/users/me")]
pub async fn delete_account(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    state.user_command.delete_account(&user_id).await?;
    session.end();
    Ok(HttpResponse::NoContent().finish())
}

/// Public profile of another user.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Public profile", body = PublicProfile),
        (status = 400, description = "Malformed id", body = Error),
        (status = 401, description = "Not signed in", body = Error),
        (status = 404, description = "No such user", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<PublicProfile>> {
    session.require_user_id()?;
    let id: UserId = parse_id(&path, FieldName::new("id"))?;
    let profile = state.users.public_profile(&id).await?;
    Ok(web::Json(profile))
}
