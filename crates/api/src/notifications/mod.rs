//! Notification aggregation and live delivery.
//!
//! `aggregator` builds the merged read-model (feed pages, unread counts,
//! catch-up mark-read) on demand; `relay` bridges domain events onto the
//! WebSocket bus so connected clients know to refresh.

pub mod aggregator;
pub mod relay;
