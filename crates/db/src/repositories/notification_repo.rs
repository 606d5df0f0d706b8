//! Repository for the `notifications` table.

use sqlx::PgPool;

use lectra_core::types::DbId;

use crate::models::notification::Notification;

/// Column list for `notifications` queries.
const COLUMNS: &str = "id, user_id, source, kind, title, message, created_at";

/// Provides insert and feed queries for stored notifications.
pub struct NotificationRepo;

impl NotificationRepo {
    /// Create a notification for a user, returning the generated id.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        source: &str,
        kind: &str,
        title: &str,
        message: &str,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO notifications (user_id, source, kind, title, message) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id",
        )
        .bind(user_id)
        .bind(source)
        .bind(kind)
        .bind(title)
        .bind(message)
        .fetch_one(pool)
        .await
    }

    /// Recent window of notifications addressed to a user, newest first.
    pub async fn recent_for_user(
        pool: &PgPool,
        user_id: DbId,
        window: i64,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notifications \
             WHERE user_id = $1 \
             ORDER BY created_at DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(user_id)
            .bind(window)
            .fetch_all(pool)
            .await
    }

    /// All `(id, source)` pairs addressed to a user, for unread counting and
    /// catch-up mark-read across the `system` and `account` namespaces.
    pub async fn ids_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<(DbId, String)>, sqlx::Error> {
        sqlx::query_as("SELECT id, source FROM notifications WHERE user_id = $1 ORDER BY id")
            .bind(user_id)
            .fetch_all(pool)
            .await
    }
}
