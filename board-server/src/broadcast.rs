//! WebSocket broadcast coordination for the shared drawing session.
//!
//! Each connection runs [`handle_board_socket`]: the participant joins,
//! receives a full state snapshot, and then exchanges messages until it
//! disconnects. All session mutations and their fan-out ordering go through
//! [`BoardState`], which serializes them so the order strokes are appended is
//! exactly the order every participant receives them in.

use std::sync::{Arc, Mutex};

use axum::extract::ws::{Message, WebSocket};
use board_core::message::{ClientMessage, ServerMessage};
use board_core::session::{SessionSnapshot, SessionStore};
use board_core::stroke::Stroke;
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::metrics::{
    dec_ws_connections, inc_ws_connections, record_stroke_appended, record_validation_failure,
    record_ws_message,
};

/// Broadcast channel capacity; slow consumers past this lag are dropped
/// messages, not backpressure.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Which participants an event is delivered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Every connected participant, the originator included.
    All,
    /// Every participant except the given one.
    Exclude(Uuid),
}

impl Scope {
    /// Whether the participant with `id` should receive the event.
    #[must_use]
    pub fn includes(self, id: Uuid) -> bool {
        match self {
            Self::All => true,
            Self::Exclude(excluded) => excluded != id,
        }
    }
}

/// Event fanned out to connected participants.
#[derive(Debug, Clone)]
pub struct BoardEvent {
    /// The message to deliver.
    pub message: ServerMessage,
    /// Delivery scope.
    pub scope: Scope,
}

/// Shared state for the drawing session: the authoritative store plus the
/// broadcast channel every connection listens on.
///
/// The `relay_order` lock makes "mutate the store, then enqueue the
/// broadcast" one atomic step, so append order always equals relay order --
/// the invariant that lets every client replay to the same image.
#[derive(Clone)]
pub struct BoardState {
    store: SessionStore,
    event_tx: broadcast::Sender<BoardEvent>,
    relay_order: Arc<Mutex<()>>,
}

impl BoardState {
    /// Create state for a fresh, empty session.
    #[must_use]
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            store: SessionStore::new(),
            event_tx,
            relay_order: Arc::new(Mutex::new(())),
        }
    }

    /// Get the underlying session store.
    #[must_use]
    pub fn store(&self) -> SessionStore {
        self.store.clone()
    }

    /// Take a by-value snapshot of the session.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.store.snapshot()
    }

    /// Register a participant and produce its initial state.
    ///
    /// Subscribing, snapshotting, and announcing happen under the relay-order
    /// lock, so the snapshot plus the subsequent event stream contain every
    /// stroke exactly once. Join notifications go to the *other* participants
    /// only; the updated count goes to everyone, the joiner included.
    pub fn join(&self, user_id: Uuid) -> (SessionSnapshot, broadcast::Receiver<BoardEvent>) {
        let _order = self
            .relay_order
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let receiver = self.event_tx.subscribe();
        let snapshot = self.store.snapshot();
        let user_count = self.store.add_participant(user_id);

        tracing::info!(%user_id, user_count, "participant joined");

        self.send_event(
            ServerMessage::UserJoin {
                user_id,
                user_count,
            },
            Scope::Exclude(user_id),
        );
        self.send_event(ServerMessage::UserCount { count: user_count }, Scope::All);

        (snapshot, receiver)
    }

    /// Remove a participant and notify the remaining ones.
    pub fn leave(&self, user_id: Uuid) {
        let _order = self
            .relay_order
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let user_count = self.store.remove_participant(user_id);

        tracing::info!(%user_id, user_count, "participant left");

        self.send_event(
            ServerMessage::UserLeave {
                user_id,
                user_count,
            },
            Scope::Exclude(user_id),
        );
        self.send_event(ServerMessage::UserCount { count: user_count }, Scope::All);
    }

    /// Append a validated stroke and relay it to everyone but the sender,
    /// who already rendered it locally.
    pub fn submit_stroke(&self, sender: Uuid, stroke: Stroke) {
        let _order = self
            .relay_order
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        self.store.append(stroke.clone());
        record_stroke_appended();

        self.send_event(
            ServerMessage::StrokeSubmit { stroke },
            Scope::Exclude(sender),
        );
    }

    /// Wipe the session and tell everyone, the requester included, so every
    /// client truncates its local history in lock-step.
    pub fn clear(&self) {
        let _order = self
            .relay_order
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        self.store.clear();
        self.send_event(ServerMessage::ClearBroadcast, Scope::All);
    }

    fn send_event(&self, message: ServerMessage, scope: Scope) {
        if let Err(e) = self.event_tx.send(BoardEvent { message, scope }) {
            // No receivers is expected while nobody is connected.
            tracing::debug!("broadcast skipped: no receivers ({e})");
        }
    }
}

impl Default for BoardState {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-connection message pump.
///
/// State machine: connecting (snapshot push) -> joined (select loop) ->
/// disconnected (cleanup). Any per-message fault is logged and isolated;
/// only transport failure ends the loop.
pub async fn handle_board_socket(socket: WebSocket, state: BoardState) {
    let (mut sender, mut receiver) = socket.split();
    let user_id = Uuid::new_v4();

    let (snapshot, mut event_rx) = state.join(user_id);
    inc_ws_connections();

    // Initial full state, to this participant only.
    let sync = ServerMessage::SyncState { state: snapshot };
    if send_message(&mut sender, &sync).await.is_err() {
        state.leave(user_id);
        dec_ws_connections();
        return;
    }
    record_ws_message("outbound", "sync-state");

    loop {
        tokio::select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        handle_text_frame(&state, user_id, &text, &mut sender).await;
                    }
                    Some(Ok(Message::Close(_))) => {
                        tracing::info!(%user_id, "participant closed connection");
                        break;
                    }
                    Some(Err(e)) => {
                        tracing::warn!(%user_id, "websocket error: {e}");
                        break;
                    }
                    None => break,
                    _ => {}
                }
            }

            event = event_rx.recv() => {
                match event {
                    Ok(event) if event.scope.includes(user_id) => {
                        if send_message(&mut sender, &event.message).await.is_err() {
                            break;
                        }
                        record_ws_message("outbound", "broadcast");
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(%user_id, "participant lagged behind by {n} events");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::info!("broadcast channel closed");
                        break;
                    }
                }
            }
        }
    }

    state.leave(user_id);
    dec_ws_connections();
    tracing::info!(%user_id, "connection closed");
}

/// Handle one inbound text frame.
///
/// Malformed frames are dropped with a local diagnostic and no error reply;
/// one bad message never takes down the session loop.
async fn handle_text_frame(
    state: &BoardState,
    user_id: Uuid,
    text: &str,
    sender: &mut (impl SinkExt<Message> + Unpin),
) {
    let msg = match serde_json::from_str::<ClientMessage>(text) {
        Ok(msg) => msg,
        Err(e) => {
            tracing::warn!(%user_id, "dropping malformed message: {e}");
            record_validation_failure("parse");
            return;
        }
    };

    match msg {
        ClientMessage::StrokeSubmit { stroke } => {
            record_ws_message("inbound", "stroke-submit");
            if let Err(e) = stroke.validate() {
                tracing::warn!(%user_id, "dropping invalid stroke: {e}");
                record_validation_failure("stroke");
                return;
            }
            tracing::debug!(%user_id, points = stroke.points.len(), "stroke received");
            state.submit_stroke(user_id, stroke);
        }
        ClientMessage::ClearRequest => {
            record_ws_message("inbound", "clear-request");
            tracing::info!(%user_id, "session cleared");
            state.clear();
        }
        ClientMessage::SyncRequest => {
            record_ws_message("inbound", "sync-request");
            tracing::debug!(%user_id, "state sync requested");
            let reply = ServerMessage::SyncState {
                state: state.snapshot(),
            };
            if send_message(sender, &reply).await.is_ok() {
                record_ws_message("outbound", "sync-state");
            }
        }
    }
}

async fn send_message(
    sender: &mut (impl SinkExt<Message> + Unpin),
    message: &ServerMessage,
) -> Result<(), ()> {
    let json = match serde_json::to_string(message) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("failed to serialize outbound message: {e}");
            // Serialization failure is not a transport failure; keep the
            // connection alive.
            return Ok(());
        }
    };
    sender.send(Message::Text(json.into())).await.map_err(|_| ())
}
