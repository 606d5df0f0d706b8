//! Repository tests for report workflow writes.
//!
//! These run against a real PostgreSQL schema so the table constraints
//! (routing paired with `submitted`, optimistic version checks) are part of
//! what gets verified.

mod common;

use lectra_db::repositories::{FeedbackRepo, ReportRepo};
use sqlx::PgPool;

async fn seed_submitted_report(pool: &PgPool, reporter_id: i64) -> lectra_db::models::report::Report {
    ReportRepo::create(
        pool,
        reporter_id,
        "student",
        None,
        "weekly",
        "Week 1 progress",
        "Covered chapters 1-3.",
        "submitted",
        Some("lecturer"),
    )
    .await
    .expect("seed report")
}

// ---------------------------------------------------------------------------
// Test: moderating a routed report succeeds and clears its routing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn moderating_a_routed_report_clears_its_routing(pool: PgPool) {
    let student = common::seed_user(&pool, "moderated-student", "student").await;
    let report = seed_submitted_report(&pool, student).await;
    assert_eq!(report.submitted_to_role.as_deref(), Some("lecturer"));

    let updated = ReportRepo::moderate(&pool, report.id, Some("approved"), Some(4), report.version)
        .await
        .expect("status write must satisfy the routing constraint")
        .expect("version is current");

    assert_eq!(updated.status, "approved");
    assert_eq!(updated.rating, Some(4));
    assert_eq!(updated.submitted_to_role, None);
    assert_eq!(updated.version, report.version + 1);
}

// ---------------------------------------------------------------------------
// Test: a rating-only moderation leaves status and routing untouched
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn rating_only_moderation_keeps_the_routing(pool: PgPool) {
    let student = common::seed_user(&pool, "rated-student", "student").await;
    let report = seed_submitted_report(&pool, student).await;

    let updated = ReportRepo::moderate(&pool, report.id, None, Some(5), report.version)
        .await
        .expect("rating-only update")
        .expect("version is current");

    assert_eq!(updated.status, "submitted");
    assert_eq!(updated.submitted_to_role.as_deref(), Some("lecturer"));
    assert_eq!(updated.rating, Some(5));
}

// ---------------------------------------------------------------------------
// Test: a stale moderation write changes nothing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn stale_moderation_is_rejected(pool: PgPool) {
    let student = common::seed_user(&pool, "contended-student", "student").await;
    let report = seed_submitted_report(&pool, student).await;

    let result = ReportRepo::moderate(&pool, report.id, Some("rejected"), None, report.version + 1)
        .await
        .expect("query itself succeeds");
    assert!(result.is_none());

    let unchanged = ReportRepo::find(&pool, report.id)
        .await
        .expect("find")
        .expect("report exists");
    assert_eq!(unchanged.status, "submitted");
    assert_eq!(unchanged.version, report.version);
}

// ---------------------------------------------------------------------------
// Test: feedback entry and report transition commit together
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn feedback_commits_entry_and_transition_together(pool: PgPool) {
    let student = common::seed_user(&pool, "fb-student", "student").await;
    let lecturer = common::seed_user(&pool, "fb-lecturer", "lecturer").await;
    let report = seed_submitted_report(&pool, student).await;

    let entry = FeedbackRepo::create_with_transition(
        &pool,
        report.id,
        lecturer,
        student,
        "suggestion",
        "Add a summary section.",
        "reviewed",
        report.version,
    )
    .await
    .expect("transactional write")
    .expect("version is current");

    assert_eq!(entry.report_id, report.id);
    assert_eq!(entry.kind, "suggestion");

    let transitioned = ReportRepo::find(&pool, report.id)
        .await
        .expect("find")
        .expect("report exists");
    assert_eq!(transitioned.status, "reviewed");
    assert_eq!(transitioned.submitted_to_role, None);
    assert_eq!(transitioned.version, report.version + 1);
}

// ---------------------------------------------------------------------------
// Test: a feedback write losing the version race leaves no orphan row
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn losing_feedback_write_leaves_no_orphan_row(pool: PgPool) {
    let student = common::seed_user(&pool, "raced-student", "student").await;
    let lecturer = common::seed_user(&pool, "raced-lecturer", "lecturer").await;
    let report = seed_submitted_report(&pool, student).await;

    let result = FeedbackRepo::create_with_transition(
        &pool,
        report.id,
        lecturer,
        student,
        "approval",
        "Looks good.",
        "approved",
        report.version + 1,
    )
    .await
    .expect("query itself succeeds");
    assert!(result.is_none());

    let orphans: i64 =
        sqlx::query_scalar("SELECT COUNT(*)::BIGINT FROM feedback_entries WHERE report_id = $1")
            .bind(report.id)
            .fetch_one(&pool)
            .await
            .expect("count");
    assert_eq!(orphans, 0);

    let unchanged = ReportRepo::find(&pool, report.id)
        .await
        .expect("find")
        .expect("report exists");
    assert_eq!(unchanged.status, "submitted");
}
