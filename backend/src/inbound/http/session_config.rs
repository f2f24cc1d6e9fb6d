//! Cookie-session settings read from the environment.
//!
//! Release builds insist on every toggle being present and valid; debug
//! builds fall back to development defaults and log a warning instead.
//!
//! | Variable | Meaning | Debug default |
//! |---|---|---|
//! | `SESSION_KEY_FILE` | path of the signing key | `/var/run/secrets/session_key` |
//! | `SESSION_COOKIE_SECURE` | mark the cookie `Secure` | `true` |
//! | `SESSION_SAMESITE` | `Strict`, `Lax` or `None` | `Lax` |
//! | `SESSION_ALLOW_EPHEMERAL` | generate a key when the file is missing | `false` |

use std::path::PathBuf;

use actix_web::cookie::{Key, SameSite};
use mockable::Env;
use tracing::warn;
use zeroize::Zeroizing;

const SESSION_KEY_DEFAULT_PATH: &str = "/var/run/secrets/session_key";
const SESSION_KEY_MIN_LEN: usize = 64;
const KEY_FILE_ENV: &str = "SESSION_KEY_FILE";
const COOKIE_SECURE_ENV: &str = "SESSION_COOKIE_SECURE";
const SAMESITE_ENV: &str = "SESSION_SAMESITE";
const ALLOW_EPHEMERAL_ENV: &str = "SESSION_ALLOW_EPHEMERAL";

/// Build mode for session configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Tolerates missing toggles.
    Debug,
    /// Requires explicit, valid toggles.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    ///
    /// # Examples
    /// ```
    /// use adoption_backend::inbound::http::session_config::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// assert_eq!(mode == BuildMode::Debug, cfg!(debug_assertions));
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    const fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }

    /// Release builds surface `error`; debug builds log and use `fallback`.
    fn tolerate<T>(self, error: SessionConfigError, fallback: T) -> Result<T, SessionConfigError> {
        if self.is_debug() {
            warn!(%error, "session configuration fallback in debug build");
            Ok(fallback)
        } else {
            Err(error)
        }
    }
}

/// Validated cookie-session settings.
#[derive(Clone)]
pub struct SessionSettings {
    /// Signing and encryption key.
    pub key: Key,
    /// Whether the cookie is marked `Secure`.
    pub cookie_secure: bool,
    /// `SameSite` policy for the cookie.
    pub same_site: SameSite,
}

/// Errors raised while validating session configuration.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    /// A required environment variable is missing.
    #[error("missing required environment variable: {name}")]
    MissingEnv {
        /// Variable name.
        name: &'static str,
    },
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        /// Variable name.
        name: &'static str,
        /// Value found.
        value: String,
        /// Accepted values.
        expected: &'static str,
    },
    /// Reading the key file failed.
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        /// Key file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The key file is too short for release builds.
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        /// Key file path.
        path: PathBuf,
        /// Bytes read.
        length: usize,
        /// Minimum accepted length.
        min_len: usize,
    },
    /// `SameSite=None` without a secure cookie.
    #[error("SESSION_SAMESITE=None requires SESSION_COOKIE_SECURE=1")]
    InsecureSameSiteNone,
    /// Ephemeral keys are refused in release builds.
    #[error("SESSION_ALLOW_EPHEMERAL must be 0 in release builds")]
    EphemeralNotAllowed,
}

/// Build session settings from environment variables.
///
/// # Examples
/// ```
/// use adoption_backend::inbound::http::session_config::{BuildMode, session_settings_from_env};
/// use mockable::MockEnv;
///
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|name| match name {
///     "SESSION_ALLOW_EPHEMERAL" => Some("1".to_owned()),
///     "SESSION_KEY_FILE" => Some("/nonexistent/session_key".to_owned()),
///     _ => None,
/// });
///
/// let settings = session_settings_from_env(&env, BuildMode::Debug).expect("debug defaults");
/// assert!(settings.cookie_secure);
/// ```
pub fn session_settings_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    let reader = EnvReader { env, mode };
    let cookie_secure = reader.flag(COOKIE_SECURE_ENV, true)?;
    let same_site = reader.same_site(cookie_secure)?;
    let allow_ephemeral = reader.flag(ALLOW_EPHEMERAL_ENV, false)?;
    if allow_ephemeral && !mode.is_debug() {
        return Err(SessionConfigError::EphemeralNotAllowed);
    }
    let key = reader.key(allow_ephemeral)?;

    Ok(SessionSettings {
        key,
        cookie_secure,
        same_site,
    })
}

struct EnvReader<'a, E> {
    env: &'a E,
    mode: BuildMode,
}

impl<E: Env> EnvReader<'_, E> {
    fn required(&self, name: &'static str) -> Option<String> {
        self.env.string(name)
    }

    fn flag(&self, name: &'static str, default: bool) -> Result<bool, SessionConfigError> {
        let Some(raw) = self.required(name) else {
            return self
                .mode
                .tolerate(SessionConfigError::MissingEnv { name }, default);
        };
        match raw.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "y" => Ok(true),
            "0" | "false" | "no" | "n" => Ok(false),
            _ => self.mode.tolerate(
                SessionConfigError::InvalidEnv {
                    name,
                    value: raw,
                    expected: "1|0|true|false|yes|no|y|n",
                },
                default,
            ),
        }
    }

    fn same_site(&self, cookie_secure: bool) -> Result<SameSite, SessionConfigError> {
        let default = if self.mode.is_debug() {
            SameSite::Lax
        } else {
            SameSite::Strict
        };
        let Some(raw) = self.required(SAMESITE_ENV) else {
            return self
                .mode
                .tolerate(SessionConfigError::MissingEnv { name: SAMESITE_ENV }, default);
        };
        match raw.to_ascii_lowercase().as_str() {
            "lax" => Ok(SameSite::Lax),
            "strict" => Ok(SameSite::Strict),
            "none" if cookie_secure => Ok(SameSite::None),
            "none" => self
                .mode
                .tolerate(SessionConfigError::InsecureSameSiteNone, SameSite::None),
            _ => self.mode.tolerate(
                SessionConfigError::InvalidEnv {
                    name: SAMESITE_ENV,
                    value: raw,
                    expected: "Strict|Lax|None",
                },
                default,
            ),
        }
    }

    fn key(&self, allow_ephemeral: bool) -> Result<Key, SessionConfigError> {
        let path = PathBuf::from(
            self.env
                .string(KEY_FILE_ENV)
                .unwrap_or_else(|| SESSION_KEY_DEFAULT_PATH.to_owned()),
        );
        match std::fs::read(&path) {
            Ok(bytes) => {
                let bytes = Zeroizing::new(bytes);
                if !self.mode.is_debug() && bytes.len() < SESSION_KEY_MIN_LEN {
                    return Err(SessionConfigError::KeyTooShort {
                        path,
                        length: bytes.len(),
                        min_len: SESSION_KEY_MIN_LEN,
                    });
                }
                Ok(Key::derive_from(&bytes))
            }
            Err(source) if self.mode.is_debug() || allow_ephemeral => {
                warn!(
                    path = %path.display(),
                    error = %source,
                    "session key unreadable; generated a temporary key"
                );
                Ok(Key::generate())
            }
            Err(source) => Err(SessionConfigError::KeyRead { path, source }),
        }
    }
}
