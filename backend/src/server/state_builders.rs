//! Builders for the HTTP and WebSocket adapter state.

use std::sync::Arc;

use actix_web::web;

use adoption_backend::domain::AdoptionPolicy;
use adoption_backend::domain::ports::{ChangeFeed, ChangePublisher};
use adoption_backend::inbound::http::state::{HttpState, Repositories, ServiceContext};
use adoption_backend::inbound::ws::{OriginAllowList, WsState};
use adoption_backend::outbound::events::BroadcastChangeFeed;
use adoption_backend::outbound::memory::MemoryStore;
use adoption_backend::outbound::persistence::{
    DbPool, DieselApplicationRepository, DieselMessageRepository, DieselNotificationRepository,
    DieselPetRepository, DieselUserRepository,
};
use tracing::warn;

use super::ServerConfig;

fn service_context(policy: AdoptionPolicy, feed: &BroadcastChangeFeed) -> ServiceContext {
    ServiceContext {
        clock: Arc::new(mockable::DefaultClock),
        changes: Arc::new(feed.clone()) as Arc<dyn ChangePublisher>,
        policy,
    }
}

fn diesel_repositories(
    pool: &DbPool,
) -> Repositories<
    DieselUserRepository,
    DieselPetRepository,
    DieselApplicationRepository,
    DieselMessageRepository,
    DieselNotificationRepository,
> {
    Repositories {
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        pets: Arc::new(DieselPetRepository::new(pool.clone())),
        applications: Arc::new(DieselApplicationRepository::new(pool.clone())),
        messages: Arc::new(DieselMessageRepository::new(pool.clone())),
        notifications: Arc::new(DieselNotificationRepository::new(pool.clone())),
    }
}

/// Build the HTTP state over PostgreSQL when a pool is configured, otherwise
/// over a fresh in-memory store.
pub(super) fn build_http_state(
    db_pool: Option<&DbPool>,
    policy: AdoptionPolicy,
    feed: &BroadcastChangeFeed,
) -> web::Data<HttpState> {
    let context = service_context(policy, feed);
    let state = match db_pool {
        Some(pool) => HttpState::from_repositories(diesel_repositories(pool), context),
        None => {
            warn!("no database configured; data will not survive a restart");
            HttpState::from_repositories(Repositories::shared(Arc::new(MemoryStore::new())), context)
        }
    };
    web::Data::new(state)
}

pub(super) fn build_ws_state(
    feed: &BroadcastChangeFeed,
    origins: OriginAllowList,
) -> web::Data<WsState> {
    web::Data::new(WsState::new(
        Arc::new(feed.clone()) as Arc<dyn ChangeFeed>,
        origins,
    ))
}

/// Shared state for one server instance. The feed is the same channel the
/// services publish to and the WebSocket sessions subscribe to.
pub(super) struct BuiltState {
    pub(super) http: web::Data<HttpState>,
    pub(super) ws: web::Data<WsState>,
}

pub(super) fn build_state(config: &ServerConfig) -> BuiltState {
    let feed = BroadcastChangeFeed::new(config.feed_capacity);
    BuiltState {
        http: build_http_state(config.db_pool.as_ref(), config.policy, &feed),
        ws: build_ws_state(&feed, config.origins.clone()),
    }
}
