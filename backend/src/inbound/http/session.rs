//! Cookie-session access for handlers.
//!
//! The session holds nothing but the signed-in user's id. Handlers resolve the
//! caller through [`SessionContext::require_user_id`] and never read the
//! cookie directly.

use std::future::{Ready, ready};

use actix_session::{Session, SessionExt};
use actix_web::{FromRequest, HttpRequest, dev::Payload};

use crate::domain::{Error, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";

/// The caller's cookie session, narrowed to sign-in state.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Start a session for `user_id`, rotating the cookie.
    pub fn persist_user(&self, user_id: &UserId) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(USER_ID_KEY, user_id.to_string())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// End the session and expire the cookie.
    pub fn end(&self) {
        self.0.purge();
    }

    /// The signed-in user, if any.
    ///
    /// A stored value that no longer parses is treated as signed out.
    pub fn user_id(&self) -> Result<Option<UserId>, Error> {
        let stored = self
            .0
            .get::<String>(USER_ID_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        Ok(stored.and_then(|raw| {
            UserId::new(raw)
                .inspect_err(|error| tracing::warn!(%error, "discarding malformed session user id"))
                .ok()
        }))
    }

    /// The signed-in user, or `401 Unauthorized`.
    pub fn require_user_id(&self) -> Result<UserId, Error> {
        self.user_id()?
            .ok_or_else(|| Error::unauthorized("sign in required"))
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(Self(req.get_session())))
    }
}
