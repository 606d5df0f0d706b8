//! In-process domain event bus.
//!
//! Workflow and admin mutations publish a [`DomainEvent`] here; the API
//! layer's relay task subscribes and turns every event into a lightweight
//! "something changed" push to connected clients.

pub mod bus;

pub use bus::{event_types, DomainEvent, EventBus};
