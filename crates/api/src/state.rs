use std::sync::Arc;

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
/// The WebSocket registry is the only shared mutable structure; everything
/// else is derived fresh from the pool per request.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: lectra_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// WebSocket connection manager (the live notification bus).
    pub ws_manager: Arc<WsManager>,
    /// Event bus publishing workflow and admin mutations.
    pub event_bus: Arc<lectra_events::EventBus>,
}
