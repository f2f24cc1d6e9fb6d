//! Change-feed socket tests against a live server.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use actix_web::dev::ServerHandle;
use actix_web::http::{StatusCode, header};
use actix_web::{App, HttpResponse, HttpServer, web};
use async_trait::async_trait;
use awc::error::WsClientError;
use awc::{BoxedSocket, ws::Codec, ws::Frame};
use futures_util::StreamExt;
use rstest::rstest;
use serde_json::Value;

use super::*;
use crate::domain::ports::ChangeFeed;
use crate::domain::{ChangeEvent, ChangeKind};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::test_utils::{SESSION_COOKIE, test_session_middleware};
use crate::inbound::ws::{self, OriginAllowList, WsState};
use crate::outbound::events::BroadcastChangeFeed;
use crate::domain::ports::ChangePublisher;

type Socket = actix_codec::Framed<BoxedSocket, Codec>;

/// Feed whose first subscriber replays a fixed script, then waits forever.
struct ScriptedFeed {
    script: Mutex<Option<Vec<FeedItem>>>,
}

impl ScriptedFeed {
    fn new(items: Vec<FeedItem>) -> Self {
        Self {
            script: Mutex::new(Some(items)),
        }
    }
}

struct ScriptedStream(VecDeque<FeedItem>);

#[async_trait]
impl ChangeStream for ScriptedStream {
    async fn next(&mut self) -> FeedItem {
        match self.0.pop_front() {
            Some(item) => item,
            None => std::future::pending().await,
        }
    }
}

impl ChangeFeed for ScriptedFeed {
    fn subscribe(&self) -> Box<dyn ChangeStream> {
        let items = self
            .script
            .lock()
            .expect("script lock")
            .take()
            .unwrap_or_default();
        Box::new(ScriptedStream(items.into()))
    }
}

async fn login(session: SessionContext, path: web::Path<String>) -> actix_web::Result<HttpResponse> {
    let id = UserId::new(path.into_inner())
        .map_err(|err| actix_web::error::ErrorBadRequest(err.to_string()))?;
    session.persist_user(&id)?;
    Ok(HttpResponse::NoContent().finish())
}

struct TestServer {
    url: String,
    handle: ServerHandle,
}

impl TestServer {
    fn start(feed: Arc<dyn ChangeFeed>) -> Self {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind test listener");
        let addr = listener.local_addr().expect("listener addr");
        let state = WsState::new(feed, OriginAllowList::new(["adopt.example"]));
        let server = HttpServer::new(move || {
            App::new()
                .app_data(web::Data::new(state.clone()))
                .wrap(test_session_middleware())
                .route("/login/{id}", web::post().to(login))
                .route("/ws", web::get().to(ws::ws_entry))
        })
        .workers(1)
        .listen(listener)
        .expect("listen")
        .disable_signals()
        .run();
        let handle = server.handle();
        actix_web::rt::spawn(server);
        Self {
            url: format!("http://{addr}"),
            handle,
        }
    }

    async fn session_cookie(&self, user: &UserId) -> awc::cookie::Cookie<'static> {
        let res = awc::Client::default()
            .post(format!("{}/login/{user}", self.url))
            .send()
            .await
            .expect("login request");
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        res.cookies()
            .expect("response cookies")
            .iter()
            .find(|cookie| cookie.name() == SESSION_COOKIE)
            .map(|cookie| cookie.clone().into_owned())
            .expect("session cookie")
    }

    async fn connect(&self, user: &UserId) -> Socket {
        let cookie = self.session_cookie(user).await;
        let (_res, socket) = awc::Client::default()
            .ws(format!("{}/ws", self.url))
            .set_header(header::ORIGIN, "http://localhost:3000")
            .cookie(cookie)
            .connect()
            .await
            .expect("websocket connect");
        socket
    }
}

async fn next_json(socket: &mut Socket) -> Value {
    loop {
        match socket.next().await.expect("frame").expect("valid frame") {
            Frame::Text(bytes) => return serde_json::from_slice(&bytes).expect("json frame"),
            Frame::Ping(_) | Frame::Pong(_) => continue,
            other => panic!("expected a text frame, got {other:?}"),
        }
    }
}

async fn next_close(socket: &mut Socket) -> Option<awc::ws::CloseReason> {
    loop {
        match socket.next().await.expect("frame").expect("valid frame") {
            Frame::Close(reason) => return reason,
            Frame::Ping(_) | Frame::Pong(_) => continue,
            other => panic!("expected a close frame, got {other:?}"),
        }
    }
}

#[rstest]
#[actix_rt::test]
async fn forwards_only_changes_the_viewer_may_see() {
    let feed = Arc::new(BroadcastChangeFeed::new(16));
    let server = TestServer::start(feed.clone());
    let viewer = UserId::random();
    let mut socket = server.connect(&viewer).await;

    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(2);
    while feed.subscriber_count() == 0 {
        assert!(std::time::Instant::now() < deadline, "session never subscribed");
        actix_web::rt::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    feed.publish(ChangeEvent::user(&UserId::random(), ChangeKind::Updated));
    feed.publish(ChangeEvent::user(&viewer, ChangeKind::Updated));

    let frame = next_json(&mut socket).await;
    assert_eq!(frame["type"], "change");
    assert_eq!(frame["entity"], "user");
    assert_eq!(frame["id"], viewer.to_string());
    server.handle.stop(true).await;
}

#[rstest]
#[actix_rt::test]
async fn lag_is_reported_as_a_refetch() {
    let server = TestServer::start(Arc::new(ScriptedFeed::new(vec![FeedItem::Missed(4)])));
    let mut socket = server.connect(&UserId::random()).await;

    let frame = next_json(&mut socket).await;
    assert_eq!(frame, serde_json::json!({ "type": "refetch", "missed": 4 }));
    server.handle.stop(true).await;
}

#[rstest]
#[actix_rt::test]
async fn feed_shutdown_closes_the_socket() {
    let server = TestServer::start(Arc::new(ScriptedFeed::new(vec![FeedItem::Closed])));
    let mut socket = server.connect(&UserId::random()).await;

    let reason = next_close(&mut socket).await.expect("close reason");
    assert_eq!(reason.code, awc::ws::CloseCode::Away);
    assert_eq!(reason.description.as_deref(), Some("server shutting down"));
    server.handle.stop(true).await;
}

#[rstest]
#[actix_rt::test]
async fn silent_clients_time_out() {
    let server = TestServer::start(Arc::new(ScriptedFeed::new(Vec::new())));
    let mut socket = server.connect(&UserId::random()).await;

    let reason = next_close(&mut socket).await.expect("close reason");
    assert_eq!(reason.code, awc::ws::CloseCode::Normal);
    assert_eq!(reason.description.as_deref(), Some("heartbeat timeout"));
    server.handle.stop(true).await;
}

#[rstest]
#[actix_rt::test]
async fn anonymous_upgrades_are_refused() {
    let server = TestServer::start(Arc::new(ScriptedFeed::new(Vec::new())));
    let result = awc::Client::default()
        .ws(format!("{}/ws", server.url))
        .set_header(header::ORIGIN, "http://localhost:3000")
        .connect()
        .await;

    assert!(matches!(
        result,
        Err(WsClientError::InvalidResponseStatus(StatusCode::UNAUTHORIZED))
    ));
    server.handle.stop(true).await;
}

#[rstest]
#[actix_rt::test]
async fn foreign_origins_are_refused() {
    let server = TestServer::start(Arc::new(ScriptedFeed::new(Vec::new())));
    let cookie = server.session_cookie(&UserId::random()).await;
    let result = awc::Client::default()
        .ws(format!("{}/ws", server.url))
        .set_header(header::ORIGIN, "https://evil.example")
        .cookie(cookie)
        .connect()
        .await;

    assert!(matches!(
        result,
        Err(WsClientError::InvalidResponseStatus(StatusCode::FORBIDDEN))
    ));
    server.handle.stop(true).await;
}
