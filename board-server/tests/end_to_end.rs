//! End-to-end test: the native client against a real server.
//!
//! Drives a [`board_client::BoardClient`] and a raw WebSocket peer through a
//! full draw/relay/render cycle.

mod common;

use std::time::Duration;

use board_client::{BoardClient, TransportEvent};
use board_core::message::ServerMessage;
use board_core::stroke::Point;
use board_render::Pen;
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use common::TestServer;

/// Wait for the next transport event, panicking on timeout.
async fn next_event(client: &mut BoardClient) -> TransportEvent {
    timeout(Duration::from_secs(5), client.next_event())
        .await
        .expect("timed out waiting for event")
        .expect("transport ended")
}

#[tokio::test]
async fn client_joins_receives_state_and_renders_remote_strokes() {
    let server = TestServer::start().await;

    let mut client = BoardClient::connect(server.ws_url(), 100, 100).expect("client");

    let connected = next_event(&mut client).await;
    assert_eq!(connected, TransportEvent::Connected { reconnect: false });
    assert!(client.is_connected());

    // Initial snapshot of the empty session.
    let sync = next_event(&mut client).await;
    match sync {
        TransportEvent::Message(ServerMessage::SyncState { state }) => {
            assert!(state.strokes.is_empty());
            assert!(state.last_modified.is_none());
        }
        other => panic!("expected sync-state, got {other:?}"),
    }
    // Own user-count.
    let _ = next_event(&mut client).await;

    // A second participant draws a line across the middle.
    let (ws, _) = connect_async(&server.ws_url()).await.expect("peer");
    let (mut peer_write, _peer_read) = ws.split();
    // Client sees user-join + user-count for the peer.
    let _ = next_event(&mut client).await;
    let _ = next_event(&mut client).await;

    let stroke = json!({
        "type": "stroke-submit",
        "stroke": {
            "tool": "brush",
            "points": [{"x": 10.0, "y": 50.0}, {"x": 90.0, "y": 50.0}],
            "color": "#ff0000",
            "size": 6.0,
            "style": "solid"
        }
    });
    peer_write
        .send(Message::Text(stroke.to_string()))
        .await
        .expect("peer send");

    let relayed = next_event(&mut client).await;
    assert!(matches!(
        relayed,
        TransportEvent::Message(ServerMessage::StrokeSubmit { .. })
    ));

    // The replica rendered the remote stroke immediately.
    assert_eq!(client.replica().history().len(), 1);
    assert_eq!(client.replica().surface().alpha_at(50, 50), Some(255));

    client.shutdown();
    server.shutdown().await;
}

#[tokio::test]
async fn local_draw_submits_and_lands_in_session_log() {
    let server = TestServer::start().await;

    let mut client = BoardClient::connect(server.ws_url(), 100, 100).expect("client");
    let _ = next_event(&mut client).await; // connected
    let _ = next_event(&mut client).await; // sync-state
    let _ = next_event(&mut client).await; // user-count

    // Draw locally: renders before any network round-trip.
    client
        .replica_mut()
        .begin_stroke(Pen::brush("#0000ff", 4.0, Default::default()), Point::new(20.0, 30.0));
    client.replica_mut().extend_stroke(Point::new(80.0, 30.0));
    assert_eq!(client.replica().surface().alpha_at(50, 30), Some(255));

    let submitted = client.finish_and_submit().expect("submit").expect("stroke");
    assert_eq!(submitted.points.len(), 2);

    // The stroke reaches the authoritative log.
    let mut appended = 0;
    for _ in 0..50 {
        appended = server.board().snapshot().strokes.len();
        if appended == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(appended, 1, "submitted stroke must be appended");

    client.shutdown();
    server.shutdown().await;
}

#[tokio::test]
async fn sync_request_reconciles_replica_wholesale() {
    let server = TestServer::start().await;

    // Seed the session before the client connects.
    let drawer = uuid::Uuid::new_v4();
    for x in [10.0f32, 50.0, 90.0] {
        server.board().submit_stroke(
            drawer,
            board_core::stroke::Stroke::brush(
                vec![Point::new(x, 10.0), Point::new(x, 90.0)],
                "#00ff00",
                4.0,
            ),
        );
    }

    let mut client = BoardClient::connect(server.ws_url(), 100, 100).expect("client");
    let _ = next_event(&mut client).await; // connected

    let sync = next_event(&mut client).await;
    match sync {
        TransportEvent::Message(ServerMessage::SyncState { state }) => {
            assert_eq!(state.strokes.len(), 3);
        }
        other => panic!("expected sync-state, got {other:?}"),
    }

    // Full replacement rendered all three columns.
    assert_eq!(client.replica().history().len(), 3);
    for x in [10, 50, 90] {
        assert_eq!(client.replica().surface().alpha_at(x, 50), Some(255));
    }

    // An explicit re-sync replaces rather than duplicates.
    client.request_sync().expect("sync request");
    loop {
        match next_event(&mut client).await {
            TransportEvent::Message(ServerMessage::SyncState { .. }) => break,
            TransportEvent::Message(_) => {}
            other => panic!("unexpected transport event {other:?}"),
        }
    }
    assert_eq!(client.replica().history().len(), 3);

    client.shutdown();
    server.shutdown().await;
}

#[tokio::test]
async fn clear_request_truncates_every_replica() {
    let server = TestServer::start().await;

    let mut client = BoardClient::connect(server.ws_url(), 100, 100).expect("client");
    let _ = next_event(&mut client).await; // connected
    let _ = next_event(&mut client).await; // sync-state
    let _ = next_event(&mut client).await; // user-count

    client
        .replica_mut()
        .begin_stroke(Pen::brush("#000000", 4.0, Default::default()), Point::new(10.0, 50.0));
    client.replica_mut().extend_stroke(Point::new(90.0, 50.0));
    client.finish_and_submit().expect("submit");

    // The requester also receives the clear: symmetric, unlike stroke relay.
    client.request_clear().expect("clear request");
    loop {
        match next_event(&mut client).await {
            TransportEvent::Message(ServerMessage::ClearBroadcast) => break,
            TransportEvent::Message(_) => {}
            other => panic!("unexpected transport event {other:?}"),
        }
    }

    assert!(client.replica().history().is_empty());
    assert_eq!(client.replica().surface().alpha_at(50, 50), Some(0));
    assert!(server.board().snapshot().strokes.is_empty());

    client.shutdown();
    server.shutdown().await;
}
