//! Repository for the `feedback_entries` table.

use sqlx::PgPool;

use lectra_core::types::DbId;

use crate::models::feedback::{FeedbackEntry, FeedbackFeedRow};

/// Column list for `feedback_entries` queries.
const COLUMNS: &str = "id, report_id, author_id, recipient_id, kind, content, created_at";

/// Provides insert and feed queries for feedback entries.
pub struct FeedbackRepo;

impl FeedbackRepo {
    /// Insert a feedback entry and apply the resulting report transition in
    /// one transaction.
    ///
    /// The status write runs first, guarded on `expected_version`; a stale
    /// version rolls the whole transaction back and returns `None`, so a
    /// losing write can never leave a feedback row behind. The transition
    /// also clears `submitted_to_role`, since the report leaves `submitted`.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_with_transition(
        pool: &PgPool,
        report_id: DbId,
        author_id: DbId,
        recipient_id: DbId,
        kind: &str,
        content: &str,
        new_status: &str,
        expected_version: i32,
    ) -> Result<Option<FeedbackEntry>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let transitioned = sqlx::query(
            "UPDATE reports SET \
             status = $2, \
             submitted_to_role = NULL, \
             version = version + 1, \
             updated_at = NOW() \
             WHERE id = $1 AND version = $3",
        )
        .bind(report_id)
        .bind(new_status)
        .bind(expected_version)
        .execute(&mut *tx)
        .await?;

        if transitioned.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let query = format!(
            "INSERT INTO feedback_entries (report_id, author_id, recipient_id, kind, content) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        let entry = sqlx::query_as::<_, FeedbackEntry>(&query)
            .bind(report_id)
            .bind(author_id)
            .bind(recipient_id)
            .bind(kind)
            .bind(content)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(entry))
    }

    /// Recent feedback addressed to a user, joined with the report title for
    /// feed display.
    pub async fn recent_for_recipient(
        pool: &PgPool,
        recipient_id: DbId,
        window: i64,
    ) -> Result<Vec<FeedbackFeedRow>, sqlx::Error> {
        sqlx::query_as::<_, FeedbackFeedRow>(
            "SELECT f.id, f.report_id, f.kind, r.title AS report_title, f.created_at \
             FROM feedback_entries f \
             JOIN reports r ON r.id = f.report_id \
             WHERE f.recipient_id = $1 \
             ORDER BY f.created_at DESC \
             LIMIT $2",
        )
        .bind(recipient_id)
        .bind(window)
        .fetch_all(pool)
        .await
    }

    /// All feedback ids addressed to a user (unread counting and catch-up
    /// mark-read).
    pub async fn ids_for_recipient(
        pool: &PgPool,
        recipient_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT id FROM feedback_entries WHERE recipient_id = $1 ORDER BY id")
            .bind(recipient_id)
            .fetch_all(pool)
            .await
    }
}
