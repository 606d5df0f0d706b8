//! Entity models and DTOs, one module per table group.

pub mod audit;
pub mod feedback;
pub mod notification;
pub mod report;
pub mod user;
