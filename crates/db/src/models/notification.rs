//! System notification entity model.

use serde::Serialize;
use sqlx::FromRow;

use lectra_core::types::{DbId, Timestamp};

/// A stored notification row addressed to one user.
///
/// `source` is either `system` or `account` and selects the read-receipt
/// namespace the row is acknowledged under. Rows are immutable; read state is
/// derived through read receipts, never stored here.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub user_id: DbId,
    pub source: String,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub created_at: Timestamp,
}
