//! Handlers for privileged user administration and the audit trail.
//!
//! All endpoints require the admin role. Every bulk mutation appends one
//! hash-chained audit entry covering the whole target set.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use lectra_core::audit::{self, AdminAction};
use lectra_core::error::CoreError;
use lectra_core::feed::clamp_pagination;
use lectra_core::roles::Role;
use lectra_core::types::DbId;
use lectra_db::models::audit::AuditFilter;
use lectra_db::repositories::{AuditRepo, NotificationRepo, UserRepo};
use lectra_events::{event_types, DomainEvent};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / query parameter types
// ---------------------------------------------------------------------------

/// Request body for `POST /admin/users/bulk`.
#[derive(Debug, Deserialize)]
pub struct BulkUserActionRequest {
    /// One of `activate`, `deactivate`, `delete`, `set_role`,
    /// `reset_password`.
    pub action: String,
    pub ids: Vec<DbId>,
    /// Target role; required by `set_role`, ignored otherwise.
    pub role: Option<String>,
}

/// Query parameters for `GET /admin/audit`.
#[derive(Debug, Deserialize)]
pub struct AuditQueryParams {
    pub action: Option<String>,
    /// Substring match against the acting admin's name or email.
    pub q: Option<String>,
    /// ISO 8601 lower bound (inclusive).
    pub start_date: Option<String>,
    /// ISO 8601 upper bound (inclusive).
    pub end_date: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Parse an optional ISO 8601 timestamp query parameter.
fn parse_timestamp(s: &Option<String>) -> AppResult<Option<chrono::DateTime<chrono::Utc>>> {
    match s {
        Some(v) => v
            .parse::<chrono::DateTime<chrono::Utc>>()
            .map(Some)
            .map_err(|_| AppError::BadRequest(format!("Invalid date '{v}', expected ISO 8601"))),
        None => Ok(None),
    }
}

// ---------------------------------------------------------------------------
// Bulk user actions
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/users/bulk
///
/// Apply one action to a set of user accounts. The acting admin is silently
/// dropped from the target set; unknown ids fail the whole request so the
/// audit entry never over-claims.
pub async fn bulk_user_action(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(payload): Json<BulkUserActionRequest>,
) -> AppResult<impl IntoResponse> {
    let action: AdminAction = payload.action.parse().map_err(AppError::Core)?;

    let targets = audit::filter_self_targets(admin.user_id, &payload.ids);
    audit::check_targets(&targets)?;

    let existing = UserRepo::existing_ids(&state.pool, &targets).await?;
    if existing.len() != targets.len() {
        let missing: Vec<DbId> = targets
            .iter()
            .copied()
            .filter(|id| !existing.contains(id))
            .collect();
        return Err(AppError::Core(CoreError::Validation(format!(
            "Unknown user ids: {missing:?}"
        ))));
    }

    let mut metadata: Option<serde_json::Value> = None;

    match action {
        AdminAction::Activate => {
            UserRepo::set_active(&state.pool, &targets, true).await?;
        }
        AdminAction::Deactivate => {
            UserRepo::set_active(&state.pool, &targets, false).await?;
        }
        AdminAction::Delete => {
            UserRepo::delete_many(&state.pool, &targets).await?;
        }
        AdminAction::SetRole => {
            let raw = payload.role.as_deref().ok_or_else(|| {
                AppError::Core(CoreError::Validation(
                    "Action 'set_role' requires a 'role' field".into(),
                ))
            })?;
            let role: Role = raw.parse().map_err(AppError::Core)?;
            UserRepo::set_role(&state.pool, &targets, role.as_str()).await?;
            metadata = Some(serde_json::json!({ "role": role.as_str() }));
        }
        AdminAction::ResetPassword => {
            // Credentials live in the external identity service; this side
            // only records the action and tells the affected users.
        }
    }

    // Deleted accounts can no longer receive anything.
    if action != AdminAction::Delete {
        for user_id in &targets {
            NotificationRepo::create(
                &state.pool,
                *user_id,
                "account",
                &format!("account.{action}"),
                "Your account was updated",
                &account_change_message(action, payload.role.as_deref()),
            )
            .await?;
        }
    }

    let entry = AuditRepo::record(
        &state.pool,
        admin.user_id,
        action.as_str(),
        "user",
        &targets,
        metadata.as_ref(),
    )
    .await?;

    state.event_bus.publish(
        DomainEvent::new(event_types::ADMIN_BULK_ACTION)
            .with_entity("audit_entry", entry.id)
            .with_actor(admin.user_id),
    );

    tracing::info!(
        action = %action,
        targets = targets.len(),
        audit_id = entry.id,
        "bulk user action applied"
    );

    Ok((
        StatusCode::OK,
        Json(DataResponse {
            data: serde_json::json!({
                "action": action.as_str(),
                "affected": targets,
                "audit_id": entry.id,
            }),
        }),
    ))
}

fn account_change_message(action: AdminAction, role: Option<&str>) -> String {
    match action {
        AdminAction::Activate => "An administrator activated your account.".into(),
        AdminAction::Deactivate => "An administrator deactivated your account.".into(),
        AdminAction::SetRole => format!(
            "An administrator changed your role to '{}'.",
            role.unwrap_or("unknown")
        ),
        AdminAction::ResetPassword => {
            "An administrator initiated a password reset for your account.".into()
        }
        // Unreachable: delete targets get no notification.
        AdminAction::Delete => "Your account was removed.".into(),
    }
}

// ---------------------------------------------------------------------------
// Audit trail queries
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/audit
///
/// Page through the audit trail, filtered by action, acting admin, and date
/// range.
pub async fn query_audit(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<AuditQueryParams>,
) -> AppResult<Json<serde_json::Value>> {
    let from = parse_timestamp(&params.start_date)?;
    let to = parse_timestamp(&params.end_date)?;
    if let (Some(f), Some(t)) = (from, to) {
        if f > t {
            return Err(AppError::BadRequest(
                "'start_date' must not be after 'end_date'".into(),
            ));
        }
    }

    let (page, limit) = clamp_pagination(params.page, params.limit);
    let filter = AuditFilter {
        action: params.action,
        search_text: params.q,
        from,
        to,
        limit,
        offset: (page - 1) * limit,
    };

    let items = AuditRepo::query(&state.pool, &filter).await?;
    let total = AuditRepo::count(&state.pool, &filter).await?;

    Ok(Json(serde_json::json!({
        "data": items,
        "meta": { "page": page, "limit": limit, "total": total }
    })))
}
