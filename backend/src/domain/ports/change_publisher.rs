//! Port for broadcasting committed changes.

use crate::domain::ChangeEvent;

/// Sink for change events.
///
/// Publishing never fails from the caller's point of view: a write has
/// already committed by the time its event is published, so adapters drop
/// events nobody is listening for.
#[cfg_attr(test, mockall::automock)]
pub trait ChangePublisher: Send + Sync {
    /// Hand `event` to every interested subscriber.
    fn publish(&self, event: ChangeEvent);
}

/// Publisher that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopChangePublisher;

impl ChangePublisher for NoopChangePublisher {
    fn publish(&self, _event: ChangeEvent) {}
}
