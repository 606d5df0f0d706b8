//! Lectra domain logic.
//!
//! Pure domain types and rules shared by the DB and API layers: the report
//! workflow state machine, role hierarchy and review routing, notification
//! feed merging, and audit helpers. No I/O happens in this crate.

pub mod audit;
pub mod error;
pub mod feed;
pub mod roles;
pub mod types;
pub mod workflow;
