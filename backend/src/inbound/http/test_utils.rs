//! Helpers for handler tests.

use actix_http::Request;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpResponse, test, web};

use super::configure_api;
use super::session::SessionContext;
use super::state::HttpState;
use crate::domain::{ApiResult, UserId};

pub const SESSION_COOKIE: &str = "session";

/// Cookie-session middleware with a throwaway key and an insecure cookie.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name(SESSION_COOKIE.to_owned())
        .cookie_secure(false)
        .build()
}

async fn force_login(session: SessionContext, path: web::Path<String>) -> ApiResult<HttpResponse> {
    let id = UserId::new(path.into_inner())
        .map_err(|err| crate::domain::Error::invalid_request(err.to_string()))?;
    session.persist_user(&id)?;
    Ok(HttpResponse::NoContent().finish())
}

/// The full `/api/v1` surface over `state`, plus a `/api/v1/test/login/{id}`
/// route that signs the caller in without going through identity sync.
pub fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new().app_data(web::Data::new(state)).service(
        web::scope("/api/v1")
            .wrap(test_session_middleware())
            .route("/test/login/{id}", web::post().to(force_login))
            .configure(configure_api),
    )
}

/// Session cookie for `user` on an app built by [`test_app`].
pub async fn login_cookie<S>(app: &S, user: &UserId) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/test/login/{user}"))
            .to_request(),
    )
    .await;
    assert!(res.status().is_success(), "test login failed");
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .map(Cookie::into_owned)
        .expect("session cookie set")
}

/// Read an error body and return its `code` field.
pub async fn error_code(res: ServiceResponse) -> String {
    let body: serde_json::Value = test::read_body_json(res).await;
    body["code"].as_str().unwrap_or_default().to_owned()
}
