//! Driving port for reading transcripts.

use async_trait::async_trait;

use crate::domain::{ApplicationId, Error, Message, UserId};

/// Driving port for application transcripts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageQuery: Send + Sync {
    /// Messages on `application`, oldest first.
    async fn transcript(
        &self,
        application: &ApplicationId,
        caller: &UserId,
    ) -> Result<Vec<Message>, Error>;
}
