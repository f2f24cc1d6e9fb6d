//! Adoption application handlers.
//!
//! ```text
//! POST /api/v1/pets/{id}/applications {"reason":"...","otherPets":"none"}
//! GET  /api/v1/pets/{id}/applications/mine
//! GET  /api/v1/applications/{id}
//! PUT  /api/v1/applications/{id}/status {"status":"accepted"}
//! GET  /api/v1/users/me/applications/sent
//! GET  /api/v1/users/me/applications/received
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{Application, ApplicationId, ApplicationStatus, Error, PetId, Questionnaire};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id};

/// Decision body for `PUT /api/v1/applications/{id}/status`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct StatusRequest {
    /// `accepted` or `rejected`.
    #[schema(example = "accepted")]
    pub status: String,
}

impl TryFrom<StatusRequest> for ApplicationStatus {
    type Error = Error;

    fn try_from(value: StatusRequest) -> Result<Self, Self::Error> {
        value.status.parse().map_err(|err: crate::domain::ParseApplicationStatusError| {
            Error::invalid_request(err.to_string())
                .with_details(json!({ "field": "status", "code": "invalid" }))
        })
    }
}

/// Apply to adopt a listing.
#[utoipa::path(
    post,
    path = "/api/v1/pets/{id}/applications",
    params(("id" = String, Path, description = "Pet identifier")),
    request_body = Questionnaire,
    responses(
        (status = 201, description = "Application submitted", body = Application),
        (status = 400, description = "Incomplete questionnaire", body = Error),
        (status = 401, description = "Not signed in", body = Error),
        (status = 403, description = "Applying to own listing", body = Error),
        (status = 404, description = "No such listing", body = Error),
        (status = 409, description = "Listing closed or already applied", body = Error)
    ),
    tags = ["applications"],
    operation_id = "submitApplication"
)]
#[post("/pets/{id}/applications")]
pub async fn submit_application(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<Questionnaire>,
) -> ApiResult<HttpResponse> {
    let applicant = session.require_user_id()?;
    let pet: PetId = parse_id(&path, FieldName::new("id"))?;
    let application = state
        .application_command
        .submit(&pet, &applicant, payload.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(application))
}

/// The caller's most recent application for a listing, or `null`.
#[utoipa::path(
    get,
    path = "/api/v1/pets/{id}/applications/mine",
    params(("id" = String, Path, description = "Pet identifier")),
    responses(
        (status = 200, description = "Latest application, or null when none exists", body = Application),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["applications"],
    operation_id = "myApplicationForPet"
)]
#[get("/pets/{id}/applications/mine")]
pub async fn my_application_for_pet(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Option<Application>>> {
    let applicant = session.require_user_id()?;
    let pet: PetId = parse_id(&path, FieldName::new("id"))?;
    Ok(web::Json(
        state.applications.latest_for_pet(&pet, &applicant).await?,
    ))
}

/// One application; visible to its two parties only.
#[utoipa::path(
    get,
    path = "/api/v1/applications/{id}",
    params(("id" = String, Path, description = "Application identifier")),
    responses(
        (status = 200, description = "Application", body = Application),
        (status = 401, description = "Not signed in", body = Error),
        (status = 403, description = "Not a party", body = Error),
        (status = 404, description = "No such application", body = Error)
    ),
    tags = ["applications"],
    operation_id = "getApplication"
)]
#[get("/applications/{id}")]
pub async fn get_application(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Application>> {
    let caller = session.require_user_id()?;
    let id: ApplicationId = parse_id(&path, FieldName::new("id"))?;
    Ok(web::Json(state.applications.get(&id, &caller).await?))
}

/// Accept or reject a pending application. Pet owner only.
#[utoipa::path(
    put,
    path = "/api/v1/applications/{id}/status",
    params(("id" = String, Path, description = "Application identifier")),
    request_body = StatusRequest,
    responses(
        (status = 200, description = "Decided application", body = Application),
        (status = 400, description = "Unknown or non-terminal status", body = Error),
        (status = 401, description = "Not signed in", body = Error),
        (status = 403, description = "Not the owner", body = Error),
        (status = 404, description = "No such application", body = Error),
        (status = 409, description = "Already decided", body = Error)
    ),
    tags = ["applications"],
    operation_id = "decideApplication"
)]
#[put("/applications/{id}/status")]
pub async fn decide_application(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<StatusRequest>,
) -> ApiResult<web::Json<Application>> {
    let caller = session.require_user_id()?;
    let id: ApplicationId = parse_id(&path, FieldName::new("id"))?;
    let status = ApplicationStatus::try_from(payload.into_inner())?;
    Ok(web::Json(
        state.application_command.decide(&id, &caller, status).await?,
    ))
}

/// Applications the caller has sent, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/users/me/applications/sent",
    responses(
        (status = 200, description = "Sent applications", body = [Application]),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["applications"],
    operation_id = "listSentApplications"
)]
#[get("/users/me/applications/sent")]
pub async fn sent_applications(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<Application>>> {
    let caller = session.require_user_id()?;
    Ok(web::Json(state.applications.list_sent(&caller).await?))
}

/// Applications received on the caller's listings, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/users/me/applications/received",
    responses(
        (status = 200, description = "Received applications", body = [Application]),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["applications"],
    operation_id = "listReceivedApplications"
)]
#[get("/users/me/applications/received")]
pub async fn received_applications(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<Application>>> {
    let caller = session.require_user_id()?;
    Ok(web::Json(state.applications.list_received(&caller).await?))
}
