//! Notification inbox handlers.
//!
//! ```text
//! GET /api/v1/users/me/notifications
//! GET /api/v1/users/me/notifications/unread-count
//! PUT /api/v1/notifications/{id}/read
//! ```

use actix_web::{get, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, Notification, NotificationId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id};

/// Unread badge payload.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UnreadCount {
    #[schema(example = 3)]
    pub count: u64,
}

/// The caller's notifications, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/users/me/notifications",
    responses(
        (status = 200, description = "Notifications", body = [Notification]),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["notifications"],
    operation_id = "listNotifications"
)]
#[get("/users/me/notifications")]
pub async fn list_notifications(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<Notification>>> {
    let caller = session.require_user_id()?;
    Ok(web::Json(state.notifications.list(&caller).await?))
}

/// Number of unread notifications for the caller.
#[utoipa::path(
    get,
    path = "/api/v1/users/me/notifications/unread-count",
    responses(
        (status = 200, description = "Unread count", body = UnreadCount),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["notifications"],
    operation_id = "unreadNotificationCount"
)]
#[get("/users/me/notifications/unread-count")]
pub async fn unread_count(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UnreadCount>> {
    let caller = session.require_user_id()?;
    let count = state.notifications.unread_count(&caller).await?;
    Ok(web::Json(UnreadCount { count }))
}

/// Mark one notification read. Repeating the call is harmless.
#[utoipa::path(
    put,
    path = "/api/v1/notifications/{id}/read",
    params(("id" = String, Path, description = "Notification identifier")),
    responses(
        (status = 200, description = "Notification, now read", body = Notification),
        (status = 401, description = "Not signed in", body = Error),
        (status = 403, description = "Not the recipient", body = Error),
        (status = 404, description = "No such notification", body = Error)
    ),
    tags = ["notifications"],
    operation_id = "markNotificationRead"
)]
#[put("/notifications/{id}/read")]
pub async fn mark_read(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Notification>> {
    let caller = session.require_user_id()?;
    let id: NotificationId = parse_id(&path, FieldName::new("id"))?;
    Ok(web::Json(
        state.notification_command.mark_read(&id, &caller).await?,
    ))
}
