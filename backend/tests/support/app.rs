//! In-process API harness over the in-memory store.
//!
//! Every test gets a fresh store, a clock that advances one second per
//! reading so ordering is deterministic, and the real `/api/v1` surface behind
//! cookie sessions.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use actix_http::Request;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::{Method, StatusCode};
use actix_web::{App, test, web};
use adoption_backend::domain::AdoptionPolicy;
use adoption_backend::domain::ports::NoopChangePublisher;
use adoption_backend::inbound::http::configure_api;
use adoption_backend::inbound::http::state::{HttpState, Repositories, ServiceContext};
use adoption_backend::outbound::memory::MemoryStore;
use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;
use serde_json::{Value, json};

pub const SESSION_COOKIE: &str = "session";

/// Clock that moves forward one second every time it is read.
pub struct SteppingClock {
    start: DateTime<Utc>,
    ticks: AtomicI64,
}

impl SteppingClock {
    pub fn new() -> Self {
        Self {
            start: Utc
                .with_ymd_and_hms(2026, 5, 1, 12, 0, 0)
                .single()
                .expect("valid start time"),
            ticks: AtomicI64::new(0),
        }
    }
}

impl Clock for SteppingClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
        self.start + Duration::seconds(tick)
    }
}

pub fn adoption_app(
    policy: AdoptionPolicy,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let state = HttpState::from_repositories(
        Repositories::shared(Arc::new(MemoryStore::new())),
        ServiceContext {
            clock: Arc::new(SteppingClock::new()),
            changes: Arc::new(NoopChangePublisher),
            policy,
        },
    );
    let session = SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name(SESSION_COOKIE.to_owned())
        .cookie_secure(false)
        .build();
    App::new().app_data(web::Data::new(state)).service(
        web::scope("/api/v1")
            .wrap(session)
            .configure(configure_api),
    )
}

/// A signed-in user.
pub struct Actor {
    pub id: String,
    cookie: Cookie<'static>,
}

impl Actor {
    pub fn request(&self, method: Method, uri: &str) -> test::TestRequest {
        test::TestRequest::default()
            .method(method)
            .uri(uri)
            .cookie(self.cookie.clone())
    }
}

/// Sign in through `POST /api/v1/session`, creating the account on first use.
pub async fn sign_in<S>(app: &S, subject: &str, name: &str) -> Actor
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/v1/session")
            .set_json(json!({
                "subject": subject,
                "name": name,
                "email": format!("{}@example.com", name.to_lowercase()),
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK, "sign-in failed");
    let cookie = res
        .response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .map(Cookie::into_owned)
        .expect("session cookie set");
    let user: Value = test::read_body_json(res).await;
    Actor {
        id: user["id"].as_str().expect("user id").to_owned(),
        cookie,
    }
}

/// Send `req` and return the status with the JSON body (`Null` when empty).
pub async fn call<S>(app: &S, req: test::TestRequest) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = test::call_service(app, req.to_request()).await;
    let status = res.status();
    let body = test::read_body(res).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("JSON body")
    };
    (status, value)
}

pub fn listing(name: &str, species: &str, size: &str, age_years: u16) -> Value {
    json!({
        "name": name,
        "species": species,
        "breed": "Mixed",
        "size": size,
        "ageYears": age_years,
        "gender": "female",
        "description": format!("{name} is looking for a home"),
        "images": [format!("https://img.example/{}.jpg", name.to_lowercase())],
        "activityLevel": "medium",
        "goodWithKids": true,
        "location": "Bristol"
    })
}

pub fn questionnaire() -> Value {
    json!({
        "reason": "We have a large garden and plenty of time",
        "otherPets": "none",
        "experience": "Grew up with dogs"
    })
}

/// Create a listing as `owner` and return its id.
pub async fn list_pet<S>(app: &S, owner: &Actor, body: Value) -> String
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let (status, pet) = call(app, owner.request(Method::POST, "/api/v1/pets").set_json(body)).await;
    assert_eq!(status, StatusCode::CREATED, "listing failed: {pet}");
    pet["id"].as_str().expect("pet id").to_owned()
}

/// Apply for `pet` as `applicant` and return the application id.
pub async fn apply<S>(app: &S, applicant: &Actor, pet: &str) -> String
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let (status, application) = call(
        app,
        applicant
            .request(Method::POST, &format!("/api/v1/pets/{pet}/applications"))
            .set_json(questionnaire()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "application failed: {application}");
    application["id"].as_str().expect("application id").to_owned()
}

pub async fn decide<S>(app: &S, owner: &Actor, application: &str, status: &str) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    call(
        app,
        owner
            .request(Method::PUT, &format!("/api/v1/applications/{application}/status"))
            .set_json(json!({ "status": status })),
    )
    .await
}
