//! HTTP handlers, one module per resource.

pub mod admin;
pub mod health;
pub mod notification;
pub mod report;
