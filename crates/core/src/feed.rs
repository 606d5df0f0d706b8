//! Merged notification feed.
//!
//! Rows from three differently-shaped sources (feedback entries, newly
//! submitted reports, system/account notifications) are normalized into one
//! [`FeedItem`] envelope, merged, ordered, and paginated here. Everything in
//! this module is pure so the ordering and pagination contract can be pinned
//! down without a database.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Default page size for the merged feed.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Hard cap on page size.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Per-source window of rows pulled into the merge.
pub const SOURCE_WINDOW: i64 = 10;

// ---------------------------------------------------------------------------
// Sources and the envelope
// ---------------------------------------------------------------------------

/// Which underlying entity a feed item (and its read receipt) refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedSource {
    Feedback,
    NewReport,
    System,
    Account,
}

impl FeedSource {
    pub fn as_str(self) -> &'static str {
        match self {
            FeedSource::Feedback => "feedback",
            FeedSource::NewReport => "new_report",
            FeedSource::System => "system",
            FeedSource::Account => "account",
        }
    }

    /// Stable rank used as the ordering tiebreak when timestamps collide.
    fn rank(self) -> u8 {
        match self {
            FeedSource::Feedback => 0,
            FeedSource::NewReport => 1,
            FeedSource::System => 2,
            FeedSource::Account => 3,
        }
    }
}

impl fmt::Display for FeedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedSource {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "feedback" => Ok(FeedSource::Feedback),
            "new_report" => Ok(FeedSource::NewReport),
            "system" => Ok(FeedSource::System),
            "account" => Ok(FeedSource::Account),
            other => Err(CoreError::Validation(format!(
                "Unknown notification source '{other}'"
            ))),
        }
    }
}

/// One entry in the merged feed.
///
/// For feedback and report items the title and message are synthesized at
/// read time by the aggregator; stored notifications carry their own.
#[derive(Debug, Clone, Serialize)]
pub struct FeedItem {
    /// Id of the source row (feedback entry, report, or notification).
    pub id: DbId,
    pub source: FeedSource,
    pub title: String,
    pub message: String,
    pub created_at: Timestamp,
    pub read: bool,
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// Pagination metadata for a feed page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub pages: i64,
}

/// Clamp raw pagination parameters to sane bounds rather than rejecting them.
///
/// `page` is floored at 1; `page_size` is clamped to `1..=MAX_PAGE_SIZE` with
/// [`DEFAULT_PAGE_SIZE`] as the fallback.
pub fn clamp_pagination(page: Option<i64>, page_size: Option<i64>) -> (i64, i64) {
    let page = page.unwrap_or(1).max(1);
    let page_size = page_size
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    (page, page_size)
}

/// Merge per-source item lists into one feed ordered newest-first.
///
/// Ordering is total and deterministic for a fixed snapshot: timestamp
/// descending, then source rank, then id descending.
pub fn merge_feed(sources: Vec<Vec<FeedItem>>) -> Vec<FeedItem> {
    let mut merged: Vec<FeedItem> = sources.into_iter().flatten().collect();
    merged.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.source.rank().cmp(&b.source.rank()))
            .then_with(|| b.id.cmp(&a.id))
    });
    merged
}

/// Take one page out of an already-merged feed.
///
/// An empty feed yields an empty first page with `total = 0, pages = 1`;
/// a page past the end yields an empty item list with truthful metadata.
/// The start offset saturates, so an absurdly large page number lands on an
/// empty page instead of overflowing.
pub fn paginate(merged: Vec<FeedItem>, page: i64, page_size: i64) -> (Vec<FeedItem>, PageInfo) {
    let total = merged.len() as i64;
    let pages = (total.max(1) + page_size - 1) / page_size;
    let start = usize::try_from((page - 1).saturating_mul(page_size)).unwrap_or(usize::MAX);

    let items: Vec<FeedItem> = merged
        .into_iter()
        .skip(start)
        .take(page_size as usize)
        .collect();

    (
        items,
        PageInfo {
            page,
            page_size,
            total,
            pages: pages.max(1),
        },
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn item(id: DbId, source: FeedSource, secs: i64) -> FeedItem {
        FeedItem {
            id,
            source,
            title: format!("item {id}"),
            message: String::new(),
            created_at: Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap(),
            read: false,
        }
    }

    #[test]
    fn merge_orders_newest_first() {
        let merged = merge_feed(vec![
            vec![item(1, FeedSource::Feedback, 10), item(2, FeedSource::Feedback, 30)],
            vec![item(3, FeedSource::NewReport, 20)],
            vec![item(4, FeedSource::System, 40)],
        ]);

        let ids: Vec<DbId> = merged.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![4, 2, 3, 1]);
    }

    #[test]
    fn merge_tiebreaks_by_source_rank_then_id() {
        // Identical timestamps: feedback sorts before new_report before system,
        // and within one source higher ids come first.
        let merged = merge_feed(vec![
            vec![item(5, FeedSource::System, 0)],
            vec![item(9, FeedSource::Feedback, 0), item(2, FeedSource::Feedback, 0)],
            vec![item(7, FeedSource::NewReport, 0)],
        ]);

        let keys: Vec<(FeedSource, DbId)> = merged.iter().map(|i| (i.source, i.id)).collect();
        assert_eq!(
            keys,
            vec![
                (FeedSource::Feedback, 9),
                (FeedSource::Feedback, 2),
                (FeedSource::NewReport, 7),
                (FeedSource::System, 5),
            ]
        );
    }

    #[test]
    fn empty_feed_is_a_valid_first_page() {
        let (items, info) = paginate(Vec::new(), 1, 20);
        assert!(items.is_empty());
        assert_eq!(
            info,
            PageInfo {
                page: 1,
                page_size: 20,
                total: 0,
                pages: 1
            }
        );
    }

    #[test]
    fn pagination_is_exhaustive_and_non_overlapping() {
        let all: Vec<FeedItem> = (0..23)
            .map(|i| item(i, FeedSource::Feedback, i * 7))
            .collect();
        let merged = merge_feed(vec![all]);
        let expected: Vec<DbId> = merged.iter().map(|i| i.id).collect();

        let page_size = 5;
        let mut collected = Vec::new();
        let mut page = 1;
        loop {
            let (items, info) = paginate(merged.clone(), page, page_size);
            assert_eq!(info.total, 23);
            assert_eq!(info.pages, 5);
            collected.extend(items.iter().map(|i| i.id));
            if page >= info.pages {
                break;
            }
            page += 1;
        }

        // Concatenating all pages reproduces the full merged set, no
        // duplicates, no gaps.
        assert_eq!(collected, expected);
    }

    #[test]
    fn page_past_the_end_is_empty_with_truthful_metadata() {
        let merged = merge_feed(vec![vec![item(1, FeedSource::System, 0)]]);
        let (items, info) = paginate(merged, 9, 10);
        assert!(items.is_empty());
        assert_eq!(info.total, 1);
        assert_eq!(info.pages, 1);
        assert_eq!(info.page, 9);
    }

    #[test]
    fn huge_page_numbers_do_not_overflow() {
        // page * page_size would overflow i64; the offset must saturate and
        // the page come back empty with truthful metadata.
        let (page, page_size) = clamp_pagination(Some(i64::MAX), Some(20));
        let merged = merge_feed(vec![vec![item(1, FeedSource::Feedback, 0)]]);
        let (items, info) = paginate(merged, page, page_size);
        assert!(items.is_empty());
        assert_eq!(info.page, i64::MAX);
        assert_eq!(info.total, 1);
        assert_eq!(info.pages, 1);
    }

    #[test]
    fn clamping_never_rejects() {
        assert_eq!(clamp_pagination(None, None), (1, DEFAULT_PAGE_SIZE));
        assert_eq!(clamp_pagination(Some(0), Some(0)), (1, 1));
        assert_eq!(clamp_pagination(Some(-3), Some(10_000)), (1, MAX_PAGE_SIZE));
        assert_eq!(clamp_pagination(Some(4), Some(25)), (4, 25));
    }

    #[test]
    fn source_round_trips_through_string_form() {
        for source in [
            FeedSource::Feedback,
            FeedSource::NewReport,
            FeedSource::System,
            FeedSource::Account,
        ] {
            assert_eq!(source.as_str().parse::<FeedSource>().unwrap(), source);
        }
        assert!("email".parse::<FeedSource>().is_err());
    }
}
