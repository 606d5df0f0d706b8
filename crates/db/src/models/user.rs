//! User account model.
//!
//! Identity issuance lives outside this service; the table exists for role
//! lookups, bulk admin actions, and audit actor search.

use serde::Serialize;
use sqlx::FromRow;

use lectra_core::types::{DbId, Timestamp};

/// A user account row.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserAccount {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: Timestamp,
}
