//! WebSocket connection manager.
//!
//! Tracks every live socket by connection id and fans messages out to all of
//! them. Delivery is best-effort: a send to a closed channel is swallowed and
//! never retried, and the dead connection is pruned by its own receive loop
//! rather than during the broadcast. Clients that miss a push reconcile
//! through the notification feed on their next poll.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::ws::Message;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::sync::RwLock;

/// Per-connection outbound buffer size.
///
/// A client that stops draining its socket fills this buffer; once full,
/// further pushes to that connection are dropped instead of blocking the
/// broadcaster. The payload is a re-poll hint, so a dropped frame costs
/// nothing the next poll does not recover.
pub const SEND_BUFFER_CAPACITY: usize = 64;

/// A single registered WebSocket connection.
#[derive(Debug)]
pub struct WsConnection {
    /// Channel feeding the socket's send task.
    pub sender: mpsc::Sender<Message>,
    /// When the connection was registered.
    pub connected_at: DateTime<Utc>,
}

/// Registry of live WebSocket connections.
///
/// All methods take `&self`; interior mutability is a single `RwLock` around
/// the connection map. Broadcasts take the read lock only, so they never
/// block new connections behind slow sends.
#[derive(Debug, Default)]
pub struct WsManager {
    connections: RwLock<HashMap<String, WsConnection>>,
}

impl WsManager {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Registers a connection and returns the receiving half that the
    /// socket's send task should drain.
    pub async fn add(&self, conn_id: String) -> mpsc::Receiver<Message> {
        let (tx, rx) = mpsc::channel(SEND_BUFFER_CAPACITY);
        let conn = WsConnection {
            sender: tx,
            connected_at: Utc::now(),
        };
        let mut conns = self.connections.write().await;
        conns.insert(conn_id.clone(), conn);
        tracing::debug!(conn_id = %conn_id, total = conns.len(), "ws connection registered");
        rx
    }

    /// Removes a connection from the registry. Safe to call twice.
    pub async fn remove(&self, conn_id: &str) {
        let mut conns = self.connections.write().await;
        if conns.remove(conn_id).is_some() {
            tracing::debug!(conn_id = %conn_id, total = conns.len(), "ws connection removed");
        }
    }

    /// Sends a message to every live connection.
    ///
    /// Returns the number of connections the message was handed to. Sends
    /// never block: a full buffer drops the new frame, a closed channel is
    /// skipped, and the connection is left for its own receive loop to
    /// remove. One dead or stalled client never delays delivery to the rest.
    pub async fn broadcast(&self, message: Message) -> usize {
        let conns = self.connections.read().await;
        let mut delivered = 0usize;
        for (id, conn) in conns.iter() {
            match conn.sender.try_send(message.clone()) {
                Ok(()) => delivered += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::trace!(conn_id = %id, "ws send buffer full, dropping frame");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    tracing::trace!(conn_id = %id, "skipping closed ws channel");
                }
            }
        }
        delivered
    }

    /// Pings every connection, surfacing dead sockets on their receive loops.
    pub async fn ping_all(&self) -> usize {
        self.broadcast(Message::Ping(Vec::new().into())).await
    }

    /// Number of currently registered connections.
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Sends a close frame to every connection and clears the registry.
    /// Used during graceful shutdown. The close frame rides the same
    /// non-blocking send path; a stalled client just sees its channel drop.
    pub async fn shutdown_all(&self) {
        let mut conns = self.connections.write().await;
        for (id, conn) in conns.drain() {
            if conn.sender.try_send(Message::Close(None)).is_err() {
                tracing::trace!(conn_id = %id, "connection already gone at shutdown");
            }
        }
        tracing::info!("all ws connections closed");
    }
}
