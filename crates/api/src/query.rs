//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Generic pagination parameters (`?page=&limit=`).
///
/// Values are clamped, never rejected: page is floored at 1 and limit is
/// clamped to the feed's fixed cap (see `lectra_core::feed::clamp_pagination`).
#[derive(Debug, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}
