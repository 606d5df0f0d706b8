//! Report entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use lectra_core::types::{DbId, Timestamp};

/// A report row.
///
/// `status`, `reporter_role` and `submitted_to_role` are stored as snake_case
/// text; parse through the `lectra_core` enums when applying domain rules.
/// `version` backs the optimistic concurrency check on moderation writes.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Report {
    pub id: DbId,
    pub reporter_id: DbId,
    pub reporter_role: String,
    pub course_id: Option<DbId>,
    pub kind: String,
    pub title: String,
    pub content: String,
    pub status: String,
    pub rating: Option<i32>,
    pub submitted_to_role: Option<String>,
    pub version: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for `POST /reports`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReport {
    pub course_id: Option<DbId>,
    pub kind: String,
    pub title: String,
    pub content: String,
    /// `true` saves the report for later instead of auto-submitting it.
    #[serde(default)]
    pub draft: bool,
}

/// DTO for draft content edits (`PATCH /reports/{id}`).
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateReport {
    pub kind: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
}

/// DTO for `PUT /reports/{id}/moderate`.
#[derive(Debug, Clone, Deserialize)]
pub struct ModerateReport {
    pub status: Option<String>,
    pub rating: Option<i32>,
}
