//! Feedback entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use lectra_core::types::{DbId, Timestamp};

/// A feedback entry left by a reviewer on a report.
///
/// Immutable once created; `recipient_id` is always the report owner.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FeedbackEntry {
    pub id: DbId,
    pub report_id: DbId,
    pub author_id: DbId,
    pub recipient_id: DbId,
    pub kind: String,
    pub content: String,
    pub created_at: Timestamp,
}

/// DTO for `POST /reports/{id}/feedback`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFeedback {
    pub kind: String,
    pub content: String,
}

/// A feedback entry joined with its parent report's title, as pulled into
/// the notification feed.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FeedbackFeedRow {
    pub id: DbId,
    pub report_id: DbId,
    pub kind: String,
    pub report_title: String,
    pub created_at: Timestamp,
}
