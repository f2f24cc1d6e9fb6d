//! Server settings loaded via OrthoConfig, and the assembled server config.

use std::net::SocketAddr;

use actix_web::cookie::{Key, SameSite};
use ortho_config::OrthoConfig;
use serde::Deserialize;

use adoption_backend::domain::AdoptionPolicy;
use adoption_backend::inbound::http::session_config::SessionSettings;
use adoption_backend::inbound::ws::OriginAllowList;
use adoption_backend::outbound::events::DEFAULT_FEED_CAPACITY;
use adoption_backend::outbound::persistence::DbPool;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_POOL_SIZE: u32 = 10;

/// Tunables read from `ADOPTION_*` environment variables, config files and
/// command-line flags.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ADOPTION")]
pub struct ServerSettings {
    /// Listen address, e.g. `0.0.0.0:8080`.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. Without it the server keeps data in memory.
    pub database_url: Option<String>,
    /// Maximum pooled database connections.
    pub db_pool_size: Option<u32>,
    /// Let applicants re-apply for a pet after a rejection.
    #[ortho_config(default = false)]
    pub allow_reapply_after_rejection: bool,
    /// Only the two parties may read an application's transcript.
    #[ortho_config(default = true)]
    pub restrict_transcript_reads: bool,
    /// Change-feed events buffered per WebSocket subscriber.
    pub feed_capacity: Option<usize>,
    /// Comma-separated HTTPS domains allowed to open the change feed.
    pub allowed_origins: Option<String>,
}

impl ServerSettings {
    /// Parsed listen address.
    ///
    /// # Errors
    ///
    /// Returns an [`std::io::Error`] of kind `InvalidInput` when the
    /// configured address does not parse.
    pub fn bind_addr(&self) -> std::io::Result<SocketAddr> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid ADOPTION_BIND_ADDR '{raw}': {err}"),
            )
        })
    }

    pub fn db_pool_size(&self) -> u32 {
        self.db_pool_size.unwrap_or(DEFAULT_POOL_SIZE)
    }

    pub fn feed_capacity(&self) -> usize {
        self.feed_capacity.unwrap_or(DEFAULT_FEED_CAPACITY)
    }

    pub fn policy(&self) -> AdoptionPolicy {
        AdoptionPolicy {
            allow_reapply_after_rejection: self.allow_reapply_after_rejection,
            restrict_transcript_reads: self.restrict_transcript_reads,
        }
    }

    pub fn origins(&self) -> OriginAllowList {
        self.allowed_origins
            .as_deref()
            .map(OriginAllowList::from_csv)
            .unwrap_or_default()
    }
}

/// Everything [`super::create_server`] needs, resolved at startup.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) policy: AdoptionPolicy,
    pub(crate) feed_capacity: usize,
    pub(crate) origins: OriginAllowList,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    /// Combine validated session settings with the loaded server settings.
    ///
    /// # Errors
    ///
    /// Fails when the bind address does not parse.
    pub fn new(session: SessionSettings, settings: &ServerSettings) -> std::io::Result<Self> {
        let SessionSettings {
            key,
            cookie_secure,
            same_site,
        } = session;
        Ok(Self {
            key,
            cookie_secure,
            same_site,
            bind_addr: settings.bind_addr()?,
            db_pool: None,
            policy: settings.policy(),
            feed_capacity: settings.feed_capacity(),
            origins: settings.origins(),
            #[cfg(feature = "metrics")]
            prometheus: None,
        })
    }

    /// Persist through PostgreSQL instead of the in-memory store.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 7] = [
        "ADOPTION_BIND_ADDR",
        "ADOPTION_DATABASE_URL",
        "ADOPTION_DB_POOL_SIZE",
        "ADOPTION_ALLOW_REAPPLY_AFTER_REJECTION",
        "ADOPTION_RESTRICT_TRANSCRIPT_READS",
        "ADOPTION_FEED_CAPACITY",
        "ADOPTION_ALLOWED_ORIGINS",
    ];

    fn load() -> ServerSettings {
        ServerSettings::load_from_iter([OsString::from("adoption-backend")])
            .expect("settings should load")
    }

    #[rstest]
    fn defaults_apply_when_nothing_is_set() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load();
        assert_eq!(
            settings.bind_addr().expect("default address"),
            DEFAULT_BIND_ADDR.parse::<SocketAddr>().expect("literal")
        );
        assert!(settings.database_url.is_none());
        assert_eq!(settings.db_pool_size(), DEFAULT_POOL_SIZE);
        assert_eq!(settings.feed_capacity(), DEFAULT_FEED_CAPACITY);
        assert_eq!(settings.policy(), AdoptionPolicy::default());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("ADOPTION_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            ("ADOPTION_DATABASE_URL", Some("postgres://db/adoption".to_owned())),
            ("ADOPTION_DB_POOL_SIZE", Some("4".to_owned())),
            ("ADOPTION_ALLOW_REAPPLY_AFTER_REJECTION", Some("true".to_owned())),
            ("ADOPTION_RESTRICT_TRANSCRIPT_READS", Some("false".to_owned())),
            ("ADOPTION_FEED_CAPACITY", Some("32".to_owned())),
            ("ADOPTION_ALLOWED_ORIGINS", Some("adopt.example".to_owned())),
        ]);

        let settings = load();
        assert_eq!(
            settings.bind_addr().expect("address"),
            "127.0.0.1:9000".parse::<SocketAddr>().expect("literal")
        );
        assert_eq!(settings.database_url.as_deref(), Some("postgres://db/adoption"));
        assert_eq!(settings.db_pool_size(), 4);
        assert_eq!(settings.feed_capacity(), 32);
        assert!(settings.policy().allow_reapply_after_rejection);
        assert!(!settings.policy().restrict_transcript_reads);
        let origin = url::Url::parse("https://www.adopt.example").expect("url");
        assert!(settings.origins().allows(&origin));
    }

    #[rstest]
    fn malformed_bind_addresses_are_rejected() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));
        let settings = ServerSettings {
            bind_addr: Some("not-an-address".into()),
            ..load()
        };
        let err = settings.bind_addr().expect_err("invalid");
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
    }
}
