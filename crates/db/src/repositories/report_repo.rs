//! Repository for the `reports` table.

use sqlx::PgPool;

use lectra_core::roles::Role;
use lectra_core::types::DbId;

use crate::models::report::{Report, UpdateReport};

/// Column list for `reports` queries.
const COLUMNS: &str = "\
    id, reporter_id, reporter_role, course_id, kind, title, content, \
    status, rating, submitted_to_role, version, created_at, updated_at";

/// Provides CRUD and workflow writes for reports.
pub struct ReportRepo;

impl ReportRepo {
    /// Insert a new report.
    ///
    /// The caller has already validated the payload and computed `status` /
    /// `submitted_to_role` through the workflow guards, so both are written
    /// together here.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        pool: &PgPool,
        reporter_id: DbId,
        reporter_role: &str,
        course_id: Option<DbId>,
        kind: &str,
        title: &str,
        content: &str,
        status: &str,
        submitted_to_role: Option<&str>,
    ) -> Result<Report, sqlx::Error> {
        let query = format!(
            "INSERT INTO reports \
             (reporter_id, reporter_role, course_id, kind, title, content, status, submitted_to_role) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Report>(&query)
            .bind(reporter_id)
            .bind(reporter_role)
            .bind(course_id)
            .bind(kind)
            .bind(title)
            .bind(content)
            .bind(status)
            .bind(submitted_to_role)
            .fetch_one(pool)
            .await
    }

    /// Fetch a report by id.
    pub async fn find(pool: &PgPool, id: DbId) -> Result<Option<Report>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reports WHERE id = $1");
        sqlx::query_as::<_, Report>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a reporter's own reports, newest first.
    pub async fn list_for_reporter(
        pool: &PgPool,
        reporter_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Report>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reports \
             WHERE reporter_id = $1 \
             ORDER BY created_at DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Report>(&query)
            .bind(reporter_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Apply a draft content edit.
    pub async fn update_content(
        pool: &PgPool,
        id: DbId,
        input: &UpdateReport,
    ) -> Result<Option<Report>, sqlx::Error> {
        let query = format!(
            "UPDATE reports SET \
             kind = COALESCE($2, kind), \
             title = COALESCE($3, title), \
             content = COALESCE($4, content), \
             updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Report>(&query)
            .bind(id)
            .bind(&input.kind)
            .bind(&input.title)
            .bind(&input.content)
            .fetch_optional(pool)
            .await
    }

    /// Move a draft into `submitted`, assigning its routing target.
    ///
    /// Status and `submitted_to_role` are written in one statement, guarded
    /// on the row still being a draft. Returns `None` when another write got
    /// there first (the caller surfaces this as a conflict).
    pub async fn submit(
        pool: &PgPool,
        id: DbId,
        submitted_to_role: Option<&str>,
    ) -> Result<Option<Report>, sqlx::Error> {
        let query = format!(
            "UPDATE reports SET \
             status = 'submitted', \
             submitted_to_role = $2, \
             version = version + 1, \
             updated_at = NOW() \
             WHERE id = $1 AND status = 'draft' \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Report>(&query)
            .bind(id)
            .bind(submitted_to_role)
            .fetch_optional(pool)
            .await
    }

    /// Apply a moderation decision under an optimistic version check.
    ///
    /// Status and rating are updated together or not at all. A status write
    /// also clears `submitted_to_role`: routing only exists while a report
    /// sits in `submitted`, and the table enforces that pairing. A
    /// rating-only moderation leaves both status and routing untouched.
    /// Returns `None` when `expected_version` is stale, i.e. a concurrent
    /// moderation won; the caller maps that to `Conflict` and never
    /// auto-retries.
    pub async fn moderate(
        pool: &PgPool,
        id: DbId,
        status: Option<&str>,
        rating: Option<i32>,
        expected_version: i32,
    ) -> Result<Option<Report>, sqlx::Error> {
        let query = format!(
            "UPDATE reports SET \
             status = COALESCE($2, status), \
             submitted_to_role = CASE WHEN $2 IS NULL THEN submitted_to_role ELSE NULL END, \
             rating = COALESCE($3, rating), \
             version = version + 1, \
             updated_at = NOW() \
             WHERE id = $1 AND version = $4 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Report>(&query)
            .bind(id)
            .bind(status)
            .bind(rating)
            .bind(expected_version)
            .fetch_optional(pool)
            .await
    }

    /// Delete a report. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM reports WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Submitted-report visibility scoping
    //
    // The notification feed and the unread badge count both go through these
    // two methods so the scoping rules cannot drift apart: lecturers see
    // reports routed to them on courses they are assigned to, program leaders
    // and principal lecturers see reports routed to their role, and faculty
    // managers see every submitted report.
    // -----------------------------------------------------------------------

    /// All submitted-report ids visible to `user_id` under `role`.
    pub async fn visible_submitted_ids(
        pool: &PgPool,
        user_id: DbId,
        role: Role,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        match role {
            Role::Lecturer => {
                sqlx::query_scalar(
                    "SELECT id FROM reports \
                     WHERE status = 'submitted' AND submitted_to_role = 'lecturer' \
                       AND course_id IN \
                           (SELECT course_id FROM course_assignments WHERE lecturer_id = $1) \
                     ORDER BY id",
                )
                .bind(user_id)
                .fetch_all(pool)
                .await
            }
            Role::ProgramLeader | Role::PrincipalLecturer => {
                sqlx::query_scalar(
                    "SELECT id FROM reports \
                     WHERE status = 'submitted' AND submitted_to_role = $1 \
                     ORDER BY id",
                )
                .bind(role.as_str())
                .fetch_all(pool)
                .await
            }
            Role::FacultyManager => {
                sqlx::query_scalar("SELECT id FROM reports WHERE status = 'submitted' ORDER BY id")
                    .fetch_all(pool)
                    .await
            }
            // Students and admins have no submission inbox.
            Role::Student | Role::Admin => Ok(Vec::new()),
        }
    }

    /// Recent window of submitted reports visible to `user_id` under `role`.
    pub async fn visible_submitted_window(
        pool: &PgPool,
        user_id: DbId,
        role: Role,
        window: i64,
    ) -> Result<Vec<Report>, sqlx::Error> {
        match role {
            Role::Lecturer => {
                let query = format!(
                    "SELECT {COLUMNS} FROM reports \
                     WHERE status = 'submitted' AND submitted_to_role = 'lecturer' \
                       AND course_id IN \
                           (SELECT course_id FROM course_assignments WHERE lecturer_id = $1) \
                     ORDER BY created_at DESC \
                     LIMIT $2"
                );
                sqlx::query_as::<_, Report>(&query)
                    .bind(user_id)
                    .bind(window)
                    .fetch_all(pool)
                    .await
            }
            Role::ProgramLeader | Role::PrincipalLecturer => {
                let query = format!(
                    "SELECT {COLUMNS} FROM reports \
                     WHERE status = 'submitted' AND submitted_to_role = $1 \
                     ORDER BY created_at DESC \
                     LIMIT $2"
                );
                sqlx::query_as::<_, Report>(&query)
                    .bind(role.as_str())
                    .bind(window)
                    .fetch_all(pool)
                    .await
            }
            Role::FacultyManager => {
                let query = format!(
                    "SELECT {COLUMNS} FROM reports \
                     WHERE status = 'submitted' \
                     ORDER BY created_at DESC \
                     LIMIT $1"
                );
                sqlx::query_as::<_, Report>(&query)
                    .bind(window)
                    .fetch_all(pool)
                    .await
            }
            Role::Student | Role::Admin => Ok(Vec::new()),
        }
    }
}
