//! Repository for the `read_receipts` table.
//!
//! A receipt is an idempotent marker: at most one row per
//! `(user, source, source_id)` tuple, inserted with `ON CONFLICT DO NOTHING`
//! and never updated or deleted. Unread counts are a set difference between
//! visible ids and receipt ids, computed by the aggregator.

use std::collections::HashSet;

use sqlx::PgPool;

use lectra_core::types::DbId;

/// Provides idempotent read-marker operations.
pub struct ReadReceiptRepo;

impl ReadReceiptRepo {
    /// Mark one source item as read. A duplicate mark is a silent no-op.
    pub async fn mark_read(
        pool: &PgPool,
        user_id: DbId,
        source: &str,
        source_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO read_receipts (user_id, source, source_id) \
             VALUES ($1, $2, $3) \
             ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(source)
        .bind(source_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Batch variant of [`mark_read`](Self::mark_read) for catch-up marking.
    pub async fn mark_many_read(
        pool: &PgPool,
        user_id: DbId,
        source: &str,
        source_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        if source_ids.is_empty() {
            return Ok(());
        }
        sqlx::query(
            "INSERT INTO read_receipts (user_id, source, source_id) \
             SELECT $1, $2, unnest($3::BIGINT[]) \
             ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(source)
        .bind(source_ids)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Whether a receipt exists for the tuple.
    pub async fn is_read(
        pool: &PgPool,
        user_id: DbId,
        source: &str,
        source_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let exists: Option<i64> = sqlx::query_scalar(
            "SELECT 1 FROM read_receipts \
             WHERE user_id = $1 AND source = $2 AND source_id = $3",
        )
        .bind(user_id)
        .bind(source)
        .bind(source_id)
        .fetch_optional(pool)
        .await?;
        Ok(exists.is_some())
    }

    /// Of `candidate_ids`, the subset the user has already read.
    pub async fn read_ids(
        pool: &PgPool,
        user_id: DbId,
        source: &str,
        candidate_ids: &[DbId],
    ) -> Result<HashSet<DbId>, sqlx::Error> {
        if candidate_ids.is_empty() {
            return Ok(HashSet::new());
        }
        let ids: Vec<DbId> = sqlx::query_scalar(
            "SELECT source_id FROM read_receipts \
             WHERE user_id = $1 AND source = $2 AND source_id = ANY($3)",
        )
        .bind(user_id)
        .bind(source)
        .bind(candidate_ids)
        .fetch_all(pool)
        .await?;
        Ok(ids.into_iter().collect())
    }
}
