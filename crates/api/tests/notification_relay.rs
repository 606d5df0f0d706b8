//! Integration tests for the event-to-WebSocket relay.
//!
//! Wires a real `EventBus` to a real `WsManager` through
//! `NotificationRelay` and verifies that published domain events surface as
//! refresh frames on connected channels.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::Message;

use lectra_api::notifications::relay::NotificationRelay;
use lectra_api::ws::WsManager;
use lectra_events::{event_types, DomainEvent, EventBus};

const REFRESH_PAYLOAD: &str = r#"{"type":"notification:new"}"#;

async fn recv_text(
    rx: &mut tokio::sync::mpsc::Receiver<Message>,
) -> String {
    let msg = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for ws frame")
        .expect("channel closed");
    match msg {
        Message::Text(t) => t.to_string(),
        other => panic!("Expected Text frame, got: {other:?}"),
    }
}

#[tokio::test]
async fn published_event_reaches_connected_clients() {
    let ws_manager = WsManager::new();
    let bus = Arc::new(EventBus::default());

    let relay = NotificationRelay::new(Arc::clone(&ws_manager));
    let relay_handle = tokio::spawn(relay.run(bus.subscribe()));

    let mut rx1 = ws_manager.add("conn-1".to_string()).await;
    let mut rx2 = ws_manager.add("conn-2".to_string()).await;

    bus.publish(
        DomainEvent::new(event_types::REPORT_SUBMITTED)
            .with_entity("report", 7)
            .with_actor(3),
    );

    assert_eq!(recv_text(&mut rx1).await, REFRESH_PAYLOAD);
    assert_eq!(recv_text(&mut rx2).await, REFRESH_PAYLOAD);

    drop(bus);
    let _ = tokio::time::timeout(Duration::from_secs(2), relay_handle).await;
}

#[tokio::test]
async fn every_event_type_produces_a_refresh_frame() {
    let ws_manager = WsManager::new();
    let bus = Arc::new(EventBus::default());

    let relay = NotificationRelay::new(Arc::clone(&ws_manager));
    let relay_handle = tokio::spawn(relay.run(bus.subscribe()));

    let mut rx = ws_manager.add("conn-1".to_string()).await;

    for event_type in [
        event_types::REPORT_SUBMITTED,
        event_types::REPORT_MODERATED,
        event_types::FEEDBACK_CREATED,
        event_types::ADMIN_BULK_ACTION,
    ] {
        bus.publish(DomainEvent::new(event_type));
        assert_eq!(recv_text(&mut rx).await, REFRESH_PAYLOAD);
    }

    drop(bus);
    let _ = tokio::time::timeout(Duration::from_secs(2), relay_handle).await;
}

#[tokio::test]
async fn relay_stops_when_bus_is_dropped() {
    let ws_manager = WsManager::new();
    let bus = Arc::new(EventBus::default());

    let relay = NotificationRelay::new(Arc::clone(&ws_manager));
    let relay_handle = tokio::spawn(relay.run(bus.subscribe()));

    drop(bus);

    tokio::time::timeout(Duration::from_secs(2), relay_handle)
        .await
        .expect("relay should shut down once the bus closes")
        .expect("relay task should not panic");
}
