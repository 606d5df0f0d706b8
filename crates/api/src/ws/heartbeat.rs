use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::ws::manager::WsManager;

/// Interval between heartbeat pings (in seconds).
const HEARTBEAT_INTERVAL_SECS: u64 = 25;

/// Spawn a background task that sends periodic Ping frames to all connected
/// WebSocket clients so idle sockets survive proxies and load balancers.
///
/// The task runs until `shutdown` is cancelled. The returned `JoinHandle`
/// can be awaited to confirm the task has stopped.
pub fn start_heartbeat(
    ws_manager: Arc<WsManager>,
    shutdown: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(HEARTBEAT_INTERVAL_SECS));

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::debug!("heartbeat task stopping");
                    break;
                }
                _ = interval.tick() => {
                    let count = ws_manager.connection_count().await;
                    if count > 0 {
                        tracing::debug!(count, "WebSocket heartbeat ping");
                    }
                    ws_manager.ping_all().await;
                }
            }
        }
    })
}
