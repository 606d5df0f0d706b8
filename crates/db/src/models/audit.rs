//! Audit trail entity models and DTOs.
//!
//! Audit entries are append-only and immutable (no `updated_at`). Each entry
//! carries an integrity hash chained to its predecessor.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use lectra_core::types::{DbId, Timestamp};

/// A single audit entry recording one privileged bulk action.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AuditEntry {
    pub id: DbId,
    pub actor_id: DbId,
    pub action: String,
    pub target_type: String,
    /// Non-empty JSON array of affected entity ids.
    pub target_ids: serde_json::Value,
    pub metadata: Option<serde_json::Value>,
    pub integrity_hash: String,
    pub created_at: Timestamp,
}

/// Filter parameters for audit queries.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditFilter {
    pub action: Option<String>,
    /// Matches against the actor's name or email.
    pub search_text: Option<String>,
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
    pub limit: i64,
    pub offset: i64,
}

/// Paginated response for audit queries.
#[derive(Debug, Clone, Serialize)]
pub struct AuditPage {
    pub items: Vec<AuditEntry>,
    pub total: i64,
}
