//! Backend entry-point: loads configuration, prepares storage and serves the
//! REST API, the change feed and the health probes.

mod server;

use actix_web::web;
use color_eyre::eyre::{Context, Result, eyre};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use adoption_backend::inbound::http::health::HealthState;
use adoption_backend::inbound::http::session_config::{BuildMode, session_settings_from_env};
use adoption_backend::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};

use server::{ServerConfig, ServerSettings, create_server};

#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load_from_iter(std::env::args_os())
        .map_err(|err| eyre!("failed to load server settings: {err}"))?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .wrap_err("invalid session configuration")?;

    let mut config = ServerConfig::new(session, &settings)?;
    if let Some(url) = settings.database_url.as_deref() {
        config = config.with_db_pool(connect(url, settings.db_pool_size()).await?);
    }
    #[cfg(feature = "metrics")]
    let config = config.with_metrics(server::build_prometheus());

    info!(policy = ?settings.policy(), "starting adoption backend");
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    let outcome = server.await;
    health_state.mark_draining();
    outcome.wrap_err("server terminated with an error")
}

async fn connect(database_url: &str, pool_size: u32) -> Result<DbPool> {
    run_pending_migrations(database_url)
        .await
        .wrap_err("failed to apply database migrations")?;
    DbPool::new(PoolConfig::new(database_url).with_max_size(pool_size))
        .await
        .wrap_err("failed to build database pool")
}
