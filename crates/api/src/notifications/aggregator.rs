//! Merged notification read-model.
//!
//! Nothing here is materialized: every call fans out to the source tables
//! (feedback entries, submitted reports visible to the caller, stored
//! notifications), annotates read state from receipts, and merges through
//! the pure feed routines in `lectra_core::feed`. Each public entry point is
//! wrapped in a hard timeout so a slow source degrades to a 504 instead of
//! hanging the badge poll.

use std::time::Duration;

use lectra_core::error::CoreError;
use lectra_core::feed::{self, FeedItem, FeedSource, PageInfo, SOURCE_WINDOW};
use lectra_core::roles::Role;
use lectra_core::types::DbId;

use lectra_db::repositories::{FeedbackRepo, NotificationRepo, ReadReceiptRepo, ReportRepo};
use lectra_db::DbPool;

use crate::error::{AppError, AppResult};

/// Upper bound on one aggregation pass across all sources.
const AGGREGATION_TIMEOUT_SECS: u64 = 5;

async fn with_timeout<F, T>(fut: F) -> AppResult<T>
where
    F: std::future::Future<Output = AppResult<T>>,
{
    match tokio::time::timeout(Duration::from_secs(AGGREGATION_TIMEOUT_SECS), fut).await {
        Ok(result) => result,
        Err(_) => Err(AppError::Core(CoreError::Timeout(
            "Notification aggregation timed out".into(),
        ))),
    }
}

// ---------------------------------------------------------------------------
// Feed pages
// ---------------------------------------------------------------------------

/// One page of the merged feed for `user_id`, newest first.
pub async fn list(
    pool: &DbPool,
    user_id: DbId,
    role: Role,
    page: Option<i64>,
    page_size: Option<i64>,
) -> AppResult<(Vec<FeedItem>, PageInfo)> {
    with_timeout(async {
        let (page, page_size) = feed::clamp_pagination(page, page_size);

        let feedback = feedback_items(pool, user_id).await?;
        let reports = report_items(pool, user_id, role).await?;
        let stored = stored_items(pool, user_id).await?;

        let merged = feed::merge_feed(vec![feedback, reports, stored]);
        Ok(feed::paginate(merged, page, page_size))
    })
    .await
}

async fn feedback_items(pool: &DbPool, user_id: DbId) -> AppResult<Vec<FeedItem>> {
    let rows = FeedbackRepo::recent_for_recipient(pool, user_id, SOURCE_WINDOW).await?;
    let ids: Vec<DbId> = rows.iter().map(|r| r.id).collect();
    let read = ReadReceiptRepo::read_ids(pool, user_id, FeedSource::Feedback.as_str(), &ids).await?;

    Ok(rows
        .into_iter()
        .map(|r| FeedItem {
            read: read.contains(&r.id),
            id: r.id,
            source: FeedSource::Feedback,
            title: format!("New {} on \"{}\"", r.kind, r.report_title),
            message: format!("A reviewer left {} feedback on your report.", r.kind),
            created_at: r.created_at,
        })
        .collect())
}

async fn report_items(pool: &DbPool, user_id: DbId, role: Role) -> AppResult<Vec<FeedItem>> {
    let rows = ReportRepo::visible_submitted_window(pool, user_id, role, SOURCE_WINDOW).await?;
    let ids: Vec<DbId> = rows.iter().map(|r| r.id).collect();
    let read =
        ReadReceiptRepo::read_ids(pool, user_id, FeedSource::NewReport.as_str(), &ids).await?;

    Ok(rows
        .into_iter()
        .map(|r| FeedItem {
            read: read.contains(&r.id),
            id: r.id,
            source: FeedSource::NewReport,
            title: format!("New report submitted: \"{}\"", r.title),
            message: format!("A {} report is awaiting your review.", r.kind),
            created_at: r.created_at,
        })
        .collect())
}

async fn stored_items(pool: &DbPool, user_id: DbId) -> AppResult<Vec<FeedItem>> {
    let rows = NotificationRepo::recent_for_user(pool, user_id, SOURCE_WINDOW).await?;

    // Stored rows span two receipt namespaces, so split before the lookup.
    let system_ids: Vec<DbId> = rows
        .iter()
        .filter(|r| r.source == FeedSource::System.as_str())
        .map(|r| r.id)
        .collect();
    let account_ids: Vec<DbId> = rows
        .iter()
        .filter(|r| r.source == FeedSource::Account.as_str())
        .map(|r| r.id)
        .collect();
    let system_read =
        ReadReceiptRepo::read_ids(pool, user_id, FeedSource::System.as_str(), &system_ids).await?;
    let account_read =
        ReadReceiptRepo::read_ids(pool, user_id, FeedSource::Account.as_str(), &account_ids)
            .await?;

    rows.into_iter()
        .map(|r| {
            let source: FeedSource = r.source.parse()?;
            let read = match source {
                FeedSource::Account => account_read.contains(&r.id),
                _ => system_read.contains(&r.id),
            };
            Ok(FeedItem {
                id: r.id,
                source,
                title: r.title,
                message: r.message,
                created_at: r.created_at,
                read,
            })
        })
        .collect::<Result<Vec<_>, CoreError>>()
        .map_err(AppError::Core)
}

// ---------------------------------------------------------------------------
// Unread badge count
// ---------------------------------------------------------------------------

/// Total unread items for `user_id` across every source.
///
/// Counted over the full visible id sets, not the display windows, so the
/// badge never under-reports relative to what mark-all-read would clear.
pub async fn unread_summary(pool: &DbPool, user_id: DbId, role: Role) -> AppResult<i64> {
    with_timeout(async {
        let mut unread: i64 = 0;
        for (source, ids) in source_id_sets(pool, user_id, role).await? {
            let read = ReadReceiptRepo::read_ids(pool, user_id, source.as_str(), &ids).await?;
            unread += ids.iter().filter(|id| !read.contains(id)).count() as i64;
        }
        Ok(unread)
    })
    .await
}

// ---------------------------------------------------------------------------
// Mark-read
// ---------------------------------------------------------------------------

/// Mark one feed item as read. Idempotent.
pub async fn mark_read(
    pool: &DbPool,
    user_id: DbId,
    source: FeedSource,
    source_id: DbId,
) -> AppResult<()> {
    ReadReceiptRepo::mark_read(pool, user_id, source.as_str(), source_id).await?;
    Ok(())
}

/// Mark everything currently visible to `user_id` as read.
pub async fn mark_all_read(pool: &DbPool, user_id: DbId, role: Role) -> AppResult<()> {
    with_timeout(async {
        for (source, ids) in source_id_sets(pool, user_id, role).await? {
            ReadReceiptRepo::mark_many_read(pool, user_id, source.as_str(), &ids).await?;
        }
        Ok(())
    })
    .await
}

/// Full visible id set per source, shared by the badge count and the
/// catch-up mark-read so the two can never disagree.
async fn source_id_sets(
    pool: &DbPool,
    user_id: DbId,
    role: Role,
) -> AppResult<Vec<(FeedSource, Vec<DbId>)>> {
    let feedback_ids = FeedbackRepo::ids_for_recipient(pool, user_id).await?;
    let report_ids = ReportRepo::visible_submitted_ids(pool, user_id, role).await?;

    let mut system_ids = Vec::new();
    let mut account_ids = Vec::new();
    for (id, source) in NotificationRepo::ids_for_user(pool, user_id).await? {
        if source == FeedSource::Account.as_str() {
            account_ids.push(id);
        } else {
            system_ids.push(id);
        }
    }

    Ok(vec![
        (FeedSource::Feedback, feedback_ids),
        (FeedSource::NewReport, report_ids),
        (FeedSource::System, system_ids),
        (FeedSource::Account, account_ids),
    ])
}
