//! WebSocket change feed.
//!
//! Responsibilities:
//! - authenticate the upgrade through the cookie session
//! - validate the `Origin` header against the configured allow-list
//! - hand the socket to a per-connection loop that forwards visible changes

use actix_web::http::header::{HeaderValue, ORIGIN};
use actix_web::{HttpRequest, HttpResponse, web};
use tracing::{error, warn};
use url::Url;

use crate::inbound::http::session::SessionContext;

mod session;

pub mod messages;
pub mod state;

pub use state::{OriginAllowList, WsState};

/// Upgrade `GET /ws` into a change-feed socket for the signed-in user.
///
/// Mounted by the server behind the same session middleware as the API.
pub async fn ws_entry(
    state: web::Data<WsState>,
    session: SessionContext,
    req: HttpRequest,
    body: web::Payload,
) -> actix_web::Result<HttpResponse> {
    let viewer = session.require_user_id()?;

    let mut origins = req.headers().get_all(ORIGIN);
    let origin = origins.next().ok_or_else(|| {
        warn!("missing Origin header on change-feed upgrade");
        actix_web::error::ErrorForbidden("Origin not allowed")
    })?;
    if origins.next().is_some() {
        warn!("multiple Origin headers on change-feed upgrade");
        return Err(actix_web::error::ErrorBadRequest("Invalid Origin header"));
    }
    validate_origin(&state.origins, origin)?;

    let (response, socket, stream) = actix_ws::handle(&req, body).map_err(|err| {
        error!(error = %err, "change-feed upgrade failed");
        actix_web::error::ErrorBadRequest("WebSocket upgrade failed")
    })?;
    let changes = state.feed.subscribe();
    actix_web::rt::spawn(session::handle_ws_session(viewer, changes, socket, stream));
    Ok(response)
}

fn validate_origin(allowed: &OriginAllowList, header: &HeaderValue) -> actix_web::Result<()> {
    let raw = header.to_str().map_err(|err| {
        warn!(error = %err, "Origin header is not valid text");
        actix_web::error::ErrorBadRequest("Invalid Origin header")
    })?;
    let origin = Url::parse(raw).map_err(|err| {
        warn!(error = %err, "Origin header is not a URL");
        actix_web::error::ErrorBadRequest("Invalid Origin header")
    })?;
    if allowed.allows(&origin) {
        Ok(())
    } else {
        warn!(origin = raw, "rejected change-feed upgrade from disallowed Origin");
        Err(actix_web::error::ErrorForbidden("Origin not allowed"))
    }
}
