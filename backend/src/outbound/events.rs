//! In-process change feed backed by a Tokio broadcast channel.
//!
//! A single [`BroadcastChangeFeed`] is both the publisher handed to the
//! domain services and the subscription source handed to the WebSocket
//! adapter. Slow subscribers lose the oldest events and are told how many
//! they missed.

use async_trait::async_trait;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::trace;

use crate::domain::ChangeEvent;
use crate::domain::ports::{ChangeFeed, ChangePublisher, ChangeStream, FeedItem};

/// Default number of buffered events per subscriber.
pub const DEFAULT_FEED_CAPACITY: usize = 256;

/// Fan-out change feed.
#[derive(Debug, Clone)]
pub struct BroadcastChangeFeed {
    sender: broadcast::Sender<ChangeEvent>,
}

impl BroadcastChangeFeed {
    /// Create a feed buffering up to `capacity` events per subscriber.
    ///
    /// A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastChangeFeed {
    fn default() -> Self {
        Self::new(DEFAULT_FEED_CAPACITY)
    }
}

impl ChangePublisher for BroadcastChangeFeed {
    fn publish(&self, event: ChangeEvent) {
        if self.sender.send(event).is_err() {
            trace!("change event dropped: no subscribers");
        }
    }
}

impl ChangeFeed for BroadcastChangeFeed {
    fn subscribe(&self) -> Box<dyn ChangeStream> {
        Box::new(BroadcastStream {
            receiver: self.sender.subscribe(),
        })
    }
}

struct BroadcastStream {
    receiver: broadcast::Receiver<ChangeEvent>,
}

#[async_trait]
impl ChangeStream for BroadcastStream {
    async fn next(&mut self) -> FeedItem {
        match self.receiver.recv().await {
            Ok(event) => FeedItem::Change(event),
            Err(RecvError::Lagged(missed)) => FeedItem::Missed(missed),
            Err(RecvError::Closed) => FeedItem::Closed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChangeKind, UserId};
    use rstest::rstest;

    fn event() -> ChangeEvent {
        ChangeEvent::user(&UserId::random(), ChangeKind::Updated)
    }

    #[rstest]
    #[tokio::test]
    async fn subscribers_receive_events_in_publish_order() {
        let feed = BroadcastChangeFeed::new(8);
        let mut stream = feed.subscribe();
        let (first, second) = (event(), event());

        feed.publish(first.clone());
        feed.publish(second.clone());

        assert_eq!(stream.next().await, FeedItem::Change(first));
        assert_eq!(stream.next().await, FeedItem::Change(second));
    }

    #[rstest]
    #[tokio::test]
    async fn lagging_subscribers_learn_how_much_they_missed() {
        let feed = BroadcastChangeFeed::new(2);
        let mut stream = feed.subscribe();
        for _ in 0..5 {
            feed.publish(event());
        }

        assert_eq!(stream.next().await, FeedItem::Missed(3));
        assert!(matches!(stream.next().await, FeedItem::Change(_)));
    }

    #[rstest]
    #[tokio::test]
    async fn dropping_the_feed_closes_streams() {
        let feed = BroadcastChangeFeed::new(4);
        let mut stream = feed.subscribe();
        drop(feed);

        assert_eq!(stream.next().await, FeedItem::Closed);
    }

    #[rstest]
    fn publishing_without_subscribers_is_silent() {
        let feed = BroadcastChangeFeed::default();
        feed.publish(event());
        assert_eq!(feed.subscriber_count(), 0);
    }
}
