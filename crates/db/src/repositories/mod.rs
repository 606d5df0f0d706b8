//! Repository structs, one per table group.
//!
//! Repositories are stateless: every method takes `&PgPool` and maps directly
//! to parameterized SQL. Domain rules live in `lectra_core`; only persistence
//! concerns (including the optimistic version check on moderation) live here.

mod audit_repo;
mod feedback_repo;
mod notification_repo;
mod read_receipt_repo;
mod report_repo;
mod user_repo;

pub use audit_repo::AuditRepo;
pub use feedback_repo::FeedbackRepo;
pub use notification_repo::NotificationRepo;
pub use read_receipt_repo::ReadReceiptRepo;
pub use report_repo::ReportRepo;
pub use user_repo::UserRepo;
