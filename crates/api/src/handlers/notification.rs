//! Handlers for the `/notifications` resource.
//!
//! The feed itself is assembled on demand by the aggregator; these handlers
//! only translate between HTTP and that read-model.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use lectra_core::feed::FeedSource;
use lectra_core::types::DbId;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::notifications::aggregator;
use crate::query::PageParams;
use crate::state::AppState;

/// Request body for `POST /notifications/mark-read`.
#[derive(Debug, Deserialize)]
pub struct MarkReadRequest {
    /// Source namespace of the item (`feedback`, `new_report`, `system`,
    /// `account`).
    #[serde(rename = "type")]
    pub source: String,
    /// Id of the source row.
    pub id: DbId,
}

/// GET /api/v1/notifications
///
/// One page of the authenticated user's merged notification feed, newest
/// first.
pub async fn list_notifications(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<serde_json::Value>> {
    let (items, meta) = aggregator::list(
        &state.pool,
        auth.user_id,
        auth.role,
        params.page,
        params.limit,
    )
    .await?;

    Ok(Json(serde_json::json!({ "data": items, "meta": meta })))
}

/// GET /api/v1/notifications/count
///
/// Total unread items across every feed source, for the badge.
pub async fn unread_count(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<serde_json::Value>> {
    let count = aggregator::unread_summary(&state.pool, auth.user_id, auth.role).await?;

    Ok(Json(serde_json::json!({
        "data": { "count": count }
    })))
}

/// POST /api/v1/notifications/mark-read
///
/// Mark one feed item as read. Idempotent; repeat marks are no-ops.
pub async fn mark_read(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<MarkReadRequest>,
) -> AppResult<impl IntoResponse> {
    let source: FeedSource = payload.source.parse().map_err(AppError::Core)?;
    aggregator::mark_read(&state.pool, auth.user_id, source, payload.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/notifications/mark-all-read
///
/// Mark everything currently visible to the user as read.
pub async fn mark_all_read(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    aggregator::mark_all_read(&state.pool, auth.user_id, auth.role).await?;
    Ok(StatusCode::NO_CONTENT)
}
