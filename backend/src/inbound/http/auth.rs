//! Session endpoints.
//!
//! ```text
//! POST   /api/v1/session {"subject":"user_2abc","name":"Ada","email":"ada@example.com"}
//! DELETE /api/v1/session
//! ```
//!
//! The identity provider authenticates users upstream; this service trusts
//! the claims it is handed, syncs the local user row and keeps only the
//! resolved user id in the signed session cookie.

use actix_web::{HttpResponse, delete, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, IdentityClaims, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Identity claims presented when starting a session.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    /// Identity-provider subject.
    #[schema(example = "user_2abc")]
    pub subject: String,
    /// Display name.
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    /// Contact email.
    #[schema(example = "ada@example.com")]
    pub email: String,
}

/// Sync the caller's account from identity claims and start a session.
#[utoipa::path(
    post,
    path = "/api/v1/session",
    request_body = SessionRequest,
    responses(
        (status = 200, description = "Session started", body = User,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid claims", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["session"],
    operation_id = "createSession",
    security([])
)]
#[post("/session")]
pub async fn create_session(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SessionRequest>,
) -> ApiResult<web::Json<User>> {
    let SessionRequest {
        subject,
        name,
        email,
    } = payload.into_inner();
    let claims = IdentityClaims::try_new(&subject, &name, &email)?;
    let user = state.user_command.sync_identity(claims).await?;
    session.persist_user(&user.id)?;
    Ok(web::Json(user))
}

/// End the current session.
#[utoipa::path(
    delete,
    path = "/api/v1/session",
    responses((status = 204, description = "Session ended")),
    tags = ["session"],
    operation_id = "endSession"
)]
#[delete("/session")]
pub async fn end_session(session: SessionContext) -> HttpResponse {
    session.end();
    HttpResponse::NoContent().finish()
}
