//! WebSocket layer: connection registry, upgrade handler, and the
//! heartbeat task that keeps intermediaries from closing idle sockets.

pub mod handler;
pub mod heartbeat;
pub mod manager;

pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::{WsConnection, WsManager, SEND_BUFFER_CAPACITY};
