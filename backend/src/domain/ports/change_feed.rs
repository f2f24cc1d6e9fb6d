//! Port for subscribing to committed changes.

use async_trait::async_trait;

use crate::domain::ChangeEvent;

/// What a subscriber sees next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedItem {
    /// A change, in publish order.
    Change(ChangeEvent),
    /// The subscriber fell behind and this many events were dropped.
    Missed(u64),
    /// The feed shut down.
    Closed,
}

/// One subscriber's position in the feed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChangeStream: Send {
    /// Wait for the next item.
    async fn next(&mut self) -> FeedItem;
}

/// Source of change subscriptions.
pub trait ChangeFeed: Send + Sync {
    /// Start receiving events published from now on.
    fn subscribe(&self) -> Box<dyn ChangeStream>;
}
