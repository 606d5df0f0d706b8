//! Handlers for the `/reports` resource.
//!
//! All endpoints require authentication via [`AuthUser`]. Workflow rules
//! (ownership, status transitions, routing) live in `lectra_core::workflow`;
//! the handlers parse, delegate, persist, and publish.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use lectra_core::error::CoreError;
use lectra_core::roles::Role;
use lectra_core::types::DbId;
use lectra_core::workflow::{self, FeedbackKind, ReportStatus};
use lectra_db::models::feedback::CreateFeedback;
use lectra_db::models::report::{CreateReport, ModerateReport, UpdateReport};
use lectra_db::repositories::{FeedbackRepo, NotificationRepo, ReportRepo};
use lectra_events::{event_types, DomainEvent};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireElevated;
use crate::query::PageParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Message shown when an optimistic write loses to a concurrent one.
const CONCURRENT_EDIT_MSG: &str = "Report was modified concurrently; reload and retry";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fetch a report or surface 404.
async fn load_report(
    pool: &lectra_db::DbPool,
    id: DbId,
) -> AppResult<lectra_db::models::report::Report> {
    ReportRepo::find(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Report",
            id,
        }))
}

/// Parse the stored status string. A non-parsing row is data corruption,
/// not caller error.
fn parse_status(raw: &str) -> AppResult<ReportStatus> {
    raw.parse().map_err(|_| {
        AppError::Internal(format!("Report row carries unknown status '{raw}'"))
    })
}

fn parse_owner_role(raw: &str) -> AppResult<Role> {
    raw.parse().map_err(|_| {
        AppError::Internal(format!("Report row carries unknown role '{raw}'"))
    })
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// POST /api/v1/reports
///
/// Create a report as a draft, or submit it immediately when `draft` is
/// false. Auto-submission routes the report to the reviewer of the caller's
/// role in the same write.
pub async fn create_report(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateReport>,
) -> AppResult<impl IntoResponse> {
    let auto_submit = !payload.draft;
    let routing = workflow::check_create(auth.role, payload.course_id, auto_submit)?;

    let (status, submitted_to_role) = match routing {
        None => (ReportStatus::Draft, None),
        Some(target) => (ReportStatus::Submitted, target.map(Role::as_str)),
    };

    let report = ReportRepo::create(
        &state.pool,
        auth.user_id,
        auth.role.as_str(),
        payload.course_id,
        &payload.kind,
        &payload.title,
        &payload.content,
        status.as_str(),
        submitted_to_role,
    )
    .await?;

    if status == ReportStatus::Submitted {
        state.event_bus.publish(
            DomainEvent::new(event_types::REPORT_SUBMITTED)
                .with_entity("report", report.id)
                .with_actor(auth.user_id),
        );
    }

    tracing::info!(report_id = report.id, status = %status, "report created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: report })))
}

/// GET /api/v1/reports/{id}
///
/// Visible to the report owner and to elevated roles.
pub async fn get_report(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let report = load_report(&state.pool, id).await?;

    if report.reporter_id != auth.user_id && !auth.role.is_elevated() {
        return Err(AppError::Core(CoreError::Forbidden(
            "You may only view your own reports".into(),
        )));
    }

    Ok(Json(DataResponse { data: report }))
}

/// GET /api/v1/reports
///
/// List the caller's own reports, newest first.
pub async fn list_my_reports(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> AppResult<impl IntoResponse> {
    let (page, page_size) = lectra_core::feed::clamp_pagination(params.page, params.limit);
    let reports = ReportRepo::list_for_reporter(
        &state.pool,
        auth.user_id,
        page_size,
        (page - 1) * page_size,
    )
    .await?;

    Ok(Json(DataResponse { data: reports }))
}

/// PATCH /api/v1/reports/{id}
///
/// Edit report content. Owner-only; blocked once approved or reviewed.
pub async fn update_report(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(payload): Json<UpdateReport>,
) -> AppResult<impl IntoResponse> {
    let report = load_report(&state.pool, id).await?;
    let status = parse_status(&report.status)?;

    workflow::check_update(auth.user_id, report.reporter_id, status)?;

    let updated = ReportRepo::update_content(&state.pool, id, &payload)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Report",
            id,
        }))?;

    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /api/v1/reports/{id}
///
/// Owner-only; blocked once the report is approved or reviewed.
pub async fn delete_report(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let report = load_report(&state.pool, id).await?;
    let status = parse_status(&report.status)?;

    workflow::check_delete(auth.user_id, report.reporter_id, status)?;

    ReportRepo::delete(&state.pool, id).await?;
    tracing::info!(report_id = id, "report deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Workflow transitions
// ---------------------------------------------------------------------------

/// POST /api/v1/reports/{id}/submit
///
/// Move an owned draft into `submitted`, routing it to the reviewer of the
/// owner's role.
pub async fn submit_report(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let report = load_report(&state.pool, id).await?;
    let status = parse_status(&report.status)?;
    let owner_role = parse_owner_role(&report.reporter_role)?;

    let target = workflow::check_submit(
        auth.user_id,
        report.reporter_id,
        owner_role,
        report.course_id,
        status,
    )?;

    let submitted = ReportRepo::submit(&state.pool, id, target.map(Role::as_str))
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Conflict(CONCURRENT_EDIT_MSG.into())))?;

    state.event_bus.publish(
        DomainEvent::new(event_types::REPORT_SUBMITTED)
            .with_entity("report", id)
            .with_actor(auth.user_id),
    );

    tracing::info!(
        report_id = id,
        routed_to = submitted.submitted_to_role.as_deref().unwrap_or("none"),
        "report submitted"
    );
    Ok(Json(DataResponse { data: submitted }))
}

/// POST /api/v1/reports/{id}/moderate
///
/// Apply a moderation decision (status change and/or rating) under an
/// optimistic version check. The owner is notified through the stored
/// notification channel.
pub async fn moderate_report(
    RequireElevated(auth): RequireElevated,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(payload): Json<ModerateReport>,
) -> AppResult<impl IntoResponse> {
    let report = load_report(&state.pool, id).await?;
    let current = parse_status(&report.status)?;

    let target: Option<ReportStatus> = payload
        .status
        .as_deref()
        .map(str::parse)
        .transpose()
        .map_err(AppError::Core)?;

    workflow::check_moderation(
        auth.user_id,
        auth.role,
        report.reporter_id,
        current,
        target,
        payload.rating,
    )?;

    let updated = ReportRepo::moderate(
        &state.pool,
        id,
        target.map(ReportStatus::as_str),
        payload.rating,
        report.version,
    )
    .await?
    .ok_or_else(|| AppError::Core(CoreError::Conflict(CONCURRENT_EDIT_MSG.into())))?;

    notify_owner_moderated(&state, &updated, target, payload.rating).await?;

    state.event_bus.publish(
        DomainEvent::new(event_types::REPORT_MODERATED)
            .with_entity("report", id)
            .with_actor(auth.user_id),
    );

    tracing::info!(
        report_id = id,
        status = %updated.status,
        rating = ?updated.rating,
        "report moderated"
    );
    Ok(Json(DataResponse { data: updated }))
}

/// Store a system notification telling the owner what changed.
async fn notify_owner_moderated(
    state: &AppState,
    report: &lectra_db::models::report::Report,
    new_status: Option<ReportStatus>,
    rating: Option<i32>,
) -> AppResult<()> {
    let message = match (new_status, rating) {
        (Some(s), Some(r)) => format!("Your report was marked {s} and rated {r}."),
        (Some(s), None) => format!("Your report was marked {s}."),
        (None, Some(r)) => format!("Your report was rated {r}."),
        (None, None) => return Ok(()),
    };

    NotificationRepo::create(
        &state.pool,
        report.reporter_id,
        "system",
        "report.moderated",
        &format!("Update on \"{}\"", report.title),
        &message,
    )
    .await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Feedback
// ---------------------------------------------------------------------------

/// POST /api/v1/reports/{id}/feedback
///
/// Leave a feedback entry on a submitted or reviewed report. Any
/// authenticated user except the report owner may do so. The entry is
/// immutable; the report's status follows the feedback kind (approval
/// approves, rejection rejects, anything else marks it reviewed).
pub async fn create_feedback(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(payload): Json<CreateFeedback>,
) -> AppResult<impl IntoResponse> {
    let report = load_report(&state.pool, id).await?;
    let current = parse_status(&report.status)?;
    let kind: FeedbackKind = payload.kind.parse().map_err(AppError::Core)?;

    workflow::check_feedback(auth.user_id, report.reporter_id, current)?;

    // Entry insert and status transition commit together; a stale version
    // rolls both back, so no feedback row can outlive a lost write.
    let new_status = kind.resulting_status();
    let entry = FeedbackRepo::create_with_transition(
        &state.pool,
        id,
        auth.user_id,
        report.reporter_id,
        kind.as_str(),
        &payload.content,
        new_status.as_str(),
        report.version,
    )
    .await?
    .ok_or_else(|| AppError::Core(CoreError::Conflict(CONCURRENT_EDIT_MSG.into())))?;

    state.event_bus.publish(
        DomainEvent::new(event_types::FEEDBACK_CREATED)
            .with_entity("report", id)
            .with_actor(auth.user_id),
    );

    tracing::info!(
        report_id = id,
        feedback_id = entry.id,
        kind = %kind,
        new_status = %new_status,
        "feedback created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: entry })))
}
