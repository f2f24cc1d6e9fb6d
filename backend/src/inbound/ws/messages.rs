//! Wire payloads sent over the change-feed socket.
//!
//! The feed is one-way: clients never send application frames, only pings.

use serde::Serialize;

use crate::domain::ChangeEvent;

/// Frame pushed to a subscriber.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedMessage<'a> {
    /// An entity the subscriber can see changed; re-fetch it over HTTP.
    Change(&'a ChangeEvent),
    /// Events were dropped; re-fetch everything on screen.
    Refetch {
        /// Number of events skipped.
        missed: u64,
    },
}
