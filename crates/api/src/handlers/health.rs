//! Liveness endpoint.

use axum::extract::State;
use axum::Json;

use crate::error::AppResult;
use crate::state::AppState;

/// GET /health
///
/// Reports process liveness and database reachability, plus the current
/// WebSocket connection count for quick operational triage.
pub async fn health(State(state): State<AppState>) -> AppResult<Json<serde_json::Value>> {
    lectra_db::health_check(&state.pool).await?;
    let ws_connections = state.ws_manager.connection_count().await;

    Ok(Json(serde_json::json!({
        "status": "ok",
        "ws_connections": ws_connections,
    })))
}
