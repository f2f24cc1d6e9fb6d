//! Per-connection change-feed loop.
//!
//! Forwards the change events a user may see, pings every 5s and closes the
//! socket after 10s without client traffic. Tests shorten both intervals.

use std::time::{Duration, Instant};

use actix_ws::{CloseCode, CloseReason, Closed, Message, MessageStream, ProtocolError, Session};
use tokio::time;
use tracing::{debug, warn};

use crate::domain::UserId;
use crate::domain::ports::{ChangeStream, FeedItem};
use crate::inbound::ws::messages::FeedMessage;

#[cfg(not(test))]
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
#[cfg(test)]
const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(50);

#[cfg(not(test))]
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);
#[cfg(test)]
const CLIENT_TIMEOUT: Duration = Duration::from_millis(100);

pub(super) async fn handle_ws_session(
    viewer: UserId,
    changes: Box<dyn ChangeStream>,
    session: Session,
    stream: MessageStream,
) {
    WsSession { viewer, changes }.run(session, stream).await;
}

enum SessionError {
    ClientClosed(Option<CloseReason>),
    StreamClosed,
    HeartbeatTimeout,
    FeedClosed,
    Protocol(ProtocolError),
    Network(Closed),
}

struct WsSession {
    viewer: UserId,
    changes: Box<dyn ChangeStream>,
}

impl WsSession {
    async fn run(mut self, mut session: Session, mut stream: MessageStream) {
        let mut last_heartbeat = Instant::now();
        let mut heartbeat = time::interval(HEARTBEAT_INTERVAL);

        loop {
            let result = tokio::select! {
                _ = heartbeat.tick() => {
                    Self::handle_heartbeat_tick(&mut session, last_heartbeat).await
                }
                message = stream.recv() => {
                    Self::handle_client_message(&mut session, &mut last_heartbeat, message).await
                }
                item = self.changes.next() => {
                    self.forward(&mut session, item).await
                }
            };

            if let Err(error) = result {
                log_shutdown_reason(&error);
                if let Some(reason) = close_reason_for(error) {
                    if let Err(error) = session.close(reason).await {
                        warn!(error = %error, "failed to close change-feed socket");
                    }
                }
                return;
            }
        }
    }

    async fn handle_heartbeat_tick(
        session: &mut Session,
        last_heartbeat: Instant,
    ) -> Result<(), SessionError> {
        if last_heartbeat.elapsed() > CLIENT_TIMEOUT {
            return Err(SessionError::HeartbeatTimeout);
        }
        session.ping(b"").await.map_err(SessionError::Network)
    }

    async fn handle_client_message(
        session: &mut Session,
        last_heartbeat: &mut Instant,
        message: Option<Result<Message, ProtocolError>>,
    ) -> Result<(), SessionError> {
        let message = match message {
            None => return Err(SessionError::StreamClosed),
            Some(Err(error)) => return Err(SessionError::Protocol(error)),
            Some(Ok(message)) => message,
        };
        *last_heartbeat = Instant::now();
        match message {
            Message::Ping(payload) => session.pong(&payload).await.map_err(SessionError::Network),
            Message::Close(reason) => Err(SessionError::ClientClosed(reason)),
            Message::Text(_)
            | Message::Binary(_)
            | Message::Pong(_)
            | Message::Continuation(_)
            | Message::Nop => Ok(()),
        }
    }

    async fn forward(&self, session: &mut Session, item: FeedItem) -> Result<(), SessionError> {
        match item {
            FeedItem::Change(event) if event.audience.includes(&self.viewer) => {
                send_json(session, &FeedMessage::Change(&event)).await
            }
            FeedItem::Change(_) => Ok(()),
            FeedItem::Missed(missed) => {
                debug!(missed, viewer = %self.viewer, "change-feed subscriber lagged");
                send_json(session, &FeedMessage::Refetch { missed }).await
            }
            FeedItem::Closed => Err(SessionError::FeedClosed),
        }
    }
}

async fn send_json(session: &mut Session, payload: &FeedMessage<'_>) -> Result<(), SessionError> {
    match serde_json::to_string(payload) {
        Ok(body) => session.text(body).await.map_err(SessionError::Network),
        Err(error) => {
            warn!(error = %error, "failed to serialise change-feed frame");
            Ok(())
        }
    }
}

fn log_shutdown_reason(error: &SessionError) {
    match error {
        SessionError::HeartbeatTimeout => {
            warn!("change-feed heartbeat timeout; closing connection");
        }
        SessionError::Protocol(error) => warn!(error = %error, "change-feed protocol error"),
        SessionError::Network(error) => {
            warn!(error = %error, "change-feed send failed; closing connection");
        }
        SessionError::FeedClosed => debug!("change feed shut down; closing connection"),
        SessionError::ClientClosed(_) | SessionError::StreamClosed => {}
    }
}

fn close_reason_for(error: SessionError) -> Option<Option<CloseReason>> {
    let reason = |code, description: &str| {
        Some(Some(CloseReason {
            code,
            description: Some(description.to_owned()),
        }))
    };
    match error {
        SessionError::HeartbeatTimeout => reason(CloseCode::Normal, "heartbeat timeout"),
        SessionError::Protocol(_) => reason(CloseCode::Protocol, "protocol error"),
        SessionError::FeedClosed => reason(CloseCode::Away, "server shutting down"),
        SessionError::ClientClosed(reason) => Some(reason),
        SessionError::StreamClosed | SessionError::Network(_) => None,
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
