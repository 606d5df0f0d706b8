//! Route tree assembly.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{admin, health, notification, report};
use crate::state::AppState;
use crate::ws;

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn health_router() -> Router<AppState> {
    Router::new().route("/health", get(health::health))
}

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /reports                         POST create, GET list own
/// /reports/{id}                    GET, PATCH, DELETE
/// /reports/{id}/submit             POST submit draft
/// /reports/{id}/moderate           PUT moderation decision
/// /reports/{id}/feedback           POST feedback entry
///
/// /notifications                   GET merged feed
/// /notifications/count             GET badge count
/// /notifications/mark-read         POST mark one read
/// /notifications/mark-all-read     POST mark everything read
/// /notifications/stream            WebSocket live channel
///
/// /admin/users/bulk                POST bulk account action (admin)
/// /admin/audit                     GET audit trail (admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // -- Reports --
        .route(
            "/reports",
            post(report::create_report).get(report::list_my_reports),
        )
        .route(
            "/reports/{id}",
            get(report::get_report)
                .patch(report::update_report)
                .delete(report::delete_report),
        )
        .route("/reports/{id}/submit", post(report::submit_report))
        .route("/reports/{id}/moderate", put(report::moderate_report))
        .route("/reports/{id}/feedback", post(report::create_feedback))
        // -- Notifications --
        .route("/notifications", get(notification::list_notifications))
        .route("/notifications/count", get(notification::unread_count))
        .route("/notifications/mark-read", post(notification::mark_read))
        .route(
            "/notifications/mark-all-read",
            post(notification::mark_all_read),
        )
        .route("/notifications/stream", get(ws::ws_handler))
        // -- Admin --
        .route("/admin/users/bulk", post(admin::bulk_user_action))
        .route("/admin/audit", get(admin::query_audit))
}
