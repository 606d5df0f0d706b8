//! Repository for the `audit_entries` table.
//!
//! Entries are append-only. Each insert chains an integrity hash from the
//! previous entry; `query`/`count` share one filter builder so pagination
//! metadata always agrees with the page contents.

use sqlx::{PgPool, Postgres, QueryBuilder};

use lectra_core::audit::compute_integrity_hash;
use lectra_core::types::DbId;

use crate::models::audit::{AuditEntry, AuditFilter};

/// Column list for `audit_entries` SELECT queries (aliased for the actor join).
const COLUMNS: &str = "\
    a.id, a.actor_id, a.action, a.target_type, a.target_ids, \
    a.metadata, a.integrity_hash, a.created_at";

/// Unaliased column list for INSERT ... RETURNING.
const RETURNING_COLUMNS: &str = "\
    id, actor_id, action, target_type, target_ids, \
    metadata, integrity_hash, created_at";

/// Provides append and filtered retrieval for audit entries.
pub struct AuditRepo;

impl AuditRepo {
    /// Append one audit entry.
    ///
    /// The target set has already been validated non-empty and stripped of
    /// the actor's own id by the caller. The integrity hash covers the
    /// entry's canonical data plus the previous entry's hash.
    pub async fn record(
        pool: &PgPool,
        actor_id: DbId,
        action: &str,
        target_type: &str,
        target_ids: &[DbId],
        metadata: Option<&serde_json::Value>,
    ) -> Result<AuditEntry, sqlx::Error> {
        let prev_hash = Self::find_last_hash(pool).await?;
        let targets_json = serde_json::json!(target_ids);
        let entry_data = format!("{actor_id}|{action}|{target_type}|{targets_json}");
        let hash = compute_integrity_hash(prev_hash.as_deref(), &entry_data);

        let query = format!(
            "INSERT INTO audit_entries \
             (actor_id, action, target_type, target_ids, metadata, integrity_hash) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {RETURNING_COLUMNS}"
        );
        sqlx::query_as::<_, AuditEntry>(&query)
            .bind(actor_id)
            .bind(action)
            .bind(target_type)
            .bind(&targets_json)
            .bind(metadata)
            .bind(&hash)
            .fetch_one(pool)
            .await
    }

    /// Integrity hash of the most recent entry, if any.
    pub async fn find_last_hash(pool: &PgPool) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT integrity_hash FROM audit_entries ORDER BY id DESC LIMIT 1",
        )
        .fetch_optional(pool)
        .await
    }

    /// Query audit entries with filtering and pagination, newest first.
    pub async fn query(pool: &PgPool, filter: &AuditFilter) -> Result<Vec<AuditEntry>, sqlx::Error> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {COLUMNS} FROM audit_entries a \
             LEFT JOIN users u ON u.id = a.actor_id \
             WHERE 1 = 1"
        ));
        push_filters(&mut qb, filter);
        qb.push(" ORDER BY a.created_at DESC, a.id DESC LIMIT ")
            .push_bind(filter.limit)
            .push(" OFFSET ")
            .push_bind(filter.offset);

        qb.build_query_as::<AuditEntry>().fetch_all(pool).await
    }

    /// Count entries matching the filter (for pagination metadata).
    pub async fn count(pool: &PgPool, filter: &AuditFilter) -> Result<i64, sqlx::Error> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT COUNT(*)::BIGINT FROM audit_entries a \
             LEFT JOIN users u ON u.id = a.actor_id \
             WHERE 1 = 1",
        );
        push_filters(&mut qb, filter);

        qb.build_query_scalar::<i64>().fetch_one(pool).await
    }
}

/// Append the shared WHERE fragments for an [`AuditFilter`].
///
/// Text search matches the actor's identifying fields (name, email).
fn push_filters<'a>(qb: &mut QueryBuilder<'a, Postgres>, filter: &'a AuditFilter) {
    if let Some(action) = &filter.action {
        qb.push(" AND a.action = ").push_bind(action);
    }
    if let Some(text) = &filter.search_text {
        let pattern = format!("%{text}%");
        qb.push(" AND (u.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR u.email ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(from) = filter.from {
        qb.push(" AND a.created_at >= ").push_bind(from);
    }
    if let Some(to) = filter.to {
        qb.push(" AND a.created_at <= ").push_bind(to);
    }
}
