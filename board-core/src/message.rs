//! Wire protocol shared by the server and client crates.
//!
//! All frames are JSON text messages tagged by a `type` field.
//!
//! ## Client -> Server
//!
//! - `{"type": "stroke-submit", "stroke": {...}}`
//! - `{"type": "clear-request"}`
//! - `{"type": "sync-request"}`
//!
//! ## Server -> Client
//!
//! - `{"type": "stroke-submit", "stroke": {...}}` (relay to all but the sender)
//! - `{"type": "clear-broadcast"}` (to everyone, the requester included)
//! - `{"type": "sync-state", "strokes": [...], "lastModified": ...}`
//! - `{"type": "user-join", "userId": "...", "userCount": N}` (to all but the joiner)
//! - `{"type": "user-leave", "userId": "...", "userCount": N}`
//! - `{"type": "user-count", "count": N}` (to everyone)

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::session::SessionSnapshot;
use crate::stroke::Stroke;

/// Client-to-server message types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    /// Submit one completed stroke for the shared log.
    StrokeSubmit {
        /// The stroke to append and relay.
        stroke: Stroke,
    },
    /// Ask the server to wipe the shared log for everyone.
    ClearRequest,
    /// Request a full state snapshot (used after reconnecting).
    SyncRequest,
}

/// Server-to-client message types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// A stroke drawn by another participant.
    StrokeSubmit {
        /// The relayed stroke, unchanged from submission.
        stroke: Stroke,
    },
    /// The shared log was wiped; local history must be truncated in lock-step.
    ClearBroadcast,
    /// Full authoritative state, sent on join and as the `sync-request` reply.
    SyncState {
        /// The complete session snapshot.
        #[serde(flatten)]
        state: SessionSnapshot,
    },
    /// Another participant joined.
    UserJoin {
        /// Connection id of the joiner.
        #[serde(rename = "userId")]
        user_id: Uuid,
        /// Participant count after the join.
        #[serde(rename = "userCount")]
        user_count: usize,
    },
    /// A participant disconnected.
    UserLeave {
        /// Connection id of the leaver.
        #[serde(rename = "userId")]
        user_id: Uuid,
        /// Participant count after the leave.
        #[serde(rename = "userCount")]
        user_count: usize,
    },
    /// Current participant count, sent to everyone including the subject.
    UserCount {
        /// Number of connected participants.
        count: usize,
    },
}
