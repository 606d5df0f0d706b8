//! Event-to-WebSocket relay.
//!
//! [`NotificationRelay`] subscribes to the domain event bus and nudges every
//! connected client when anything notification-worthy happens. The push is a
//! deliberately opaque refresh signal: clients fetch the actual feed over
//! HTTP, so a missed frame costs nothing but latency.

use std::sync::Arc;

use axum::extract::ws::Message;
use tokio::sync::broadcast;

use lectra_events::DomainEvent;

use crate::ws::WsManager;

/// Wire payload pushed for every relayed event.
const REFRESH_PAYLOAD: &str = r#"{"type":"notification:new"}"#;

/// Relays domain events to all live WebSocket connections.
pub struct NotificationRelay {
    ws_manager: Arc<WsManager>,
}

impl NotificationRelay {
    pub fn new(ws_manager: Arc<WsManager>) -> Self {
        Self { ws_manager }
    }

    /// Run the relay loop.
    ///
    /// Consumes events from `receiver` until the channel is closed (i.e. the
    /// [`EventBus`](lectra_events::EventBus) is dropped). A lagged receiver
    /// only skips refresh signals, never data, so it is logged and ignored.
    pub async fn run(self, mut receiver: broadcast::Receiver<DomainEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    let delivered = self
                        .ws_manager
                        .broadcast(Message::Text(REFRESH_PAYLOAD.into()))
                        .await;
                    tracing::debug!(
                        event_type = %event.event_type,
                        delivered,
                        "relayed event to ws clients"
                    );
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification relay lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification relay shutting down");
                    break;
                }
            }
        }
    }
}
