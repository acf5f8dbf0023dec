//! Authoritative session state for one shared drawing board.
//!
//! Provides a thread-safe [`SessionStore`] shared across WebSocket
//! connections and HTTP routes. The stroke log is append-only except for a
//! full reset via [`SessionStore::clear`].

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::stroke::Stroke;

/// A currently connected participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Connection timestamp in Unix milliseconds.
    #[serde(rename = "connectedAt")]
    pub connected_at: u64,
}

/// A by-value copy of the session state at one instant.
///
/// Readers never observe a half-applied append or clear; the snapshot is
/// taken under the store lock and owns its data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// The stroke log in global arrival order.
    pub strokes: Vec<Stroke>,
    /// When the log was last mutated, in Unix milliseconds.
    #[serde(rename = "lastModified")]
    pub last_modified: Option<u64>,
}

impl SessionSnapshot {
    /// Snapshot of a session nothing has drawn on yet.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            strokes: Vec::new(),
            last_modified: None,
        }
    }
}

#[derive(Debug, Default)]
struct SessionInner {
    strokes: Vec<Stroke>,
    last_modified: Option<u64>,
    participants: HashMap<Uuid, Participant>,
}

/// Thread-safe store for one session's stroke log and participant set.
///
/// The store is exclusively server-owned; clients only submit candidate
/// operations and receive authoritative broadcasts. Mutations happen under a
/// write lock, so a reader taking [`SessionStore::snapshot`] always sees each
/// append or clear fully applied.
///
/// # Example
///
/// ```
/// use board_core::session::SessionStore;
/// use board_core::stroke::{Point, Stroke};
///
/// let store = SessionStore::new();
/// store.append(Stroke::brush(vec![Point::new(0.0, 0.0)], "#000000", 4.0));
/// assert_eq!(store.snapshot().strokes.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<SessionInner>>,
}

impl SessionStore {
    /// Create an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stroke to the log and bump `lastModified`.
    ///
    /// Content is never inspected here; structural validation happens at the
    /// message boundary before the stroke reaches the store.
    pub fn append(&self, stroke: Stroke) {
        let mut inner = self
            .inner
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        inner.strokes.push(stroke);
        inner.last_modified = Some(current_timestamp_ms());
    }

    /// Atomically replace the stroke log with an empty one.
    pub fn clear(&self) {
        let mut inner = self
            .inner
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        tracing::debug!(wiped = inner.strokes.len(), "stroke log cleared");
        inner.strokes = Vec::new();
        inner.last_modified = Some(current_timestamp_ms());
    }

    /// Take a by-value snapshot of the stroke log.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let inner = self
            .inner
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        SessionSnapshot {
            strokes: inner.strokes.clone(),
            last_modified: inner.last_modified,
        }
    }

    /// Number of strokes currently in the log.
    #[must_use]
    pub fn stroke_count(&self) -> usize {
        let inner = self
            .inner
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        inner.strokes.len()
    }

    /// Register a participant. Returns the updated participant count.
    pub fn add_participant(&self, id: Uuid) -> usize {
        let mut inner = self
            .inner
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        inner.participants.insert(
            id,
            Participant {
                connected_at: current_timestamp_ms(),
            },
        );
        inner.participants.len()
    }

    /// Remove a participant. Returns the updated participant count.
    pub fn remove_participant(&self, id: Uuid) -> usize {
        let mut inner = self
            .inner
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        inner.participants.remove(&id);
        inner.participants.len()
    }

    /// Number of currently connected participants.
    #[must_use]
    pub fn participant_count(&self) -> usize {
        let inner = self
            .inner
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        inner.participants.len()
    }
}

/// Get the current Unix timestamp in milliseconds.
#[must_use]
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| {
        // Timestamp will not exceed u64 max for millennia
        #[allow(clippy::cast_possible_truncation)]
        {
            d.as_millis() as u64
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::Point;

    fn dot(x: f32, y: f32) -> Stroke {
        Stroke::brush(vec![Point::new(x, y)], "#000000", 4.0)
    }

    #[test]
    fn test_new_session_is_empty() {
        let store = SessionStore::new();
        let snapshot = store.snapshot();
        assert!(snapshot.strokes.is_empty());
        assert!(snapshot.last_modified.is_none());
    }

    #[test]
    fn test_append_updates_log_and_timestamp() {
        let store = SessionStore::new();
        store.append(dot(1.0, 1.0));

        let snapshot = store.snapshot();
        assert_eq!(snapshot.strokes.len(), 1);
        assert!(snapshot.last_modified.is_some());
    }

    #[test]
    fn test_append_preserves_arrival_order() {
        let store = SessionStore::new();
        store.append(dot(1.0, 0.0));
        store.append(dot(2.0, 0.0));
        store.append(dot(3.0, 0.0));

        let snapshot = store.snapshot();
        let xs: Vec<f32> = snapshot.strokes.iter().map(|s| s.points[0].x).collect();
        assert_eq!(xs, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_append_then_clear_yields_empty() {
        let store = SessionStore::new();
        store.append(dot(1.0, 1.0));
        store.clear();

        let snapshot = store.snapshot();
        assert!(snapshot.strokes.is_empty());
        assert!(snapshot.last_modified.is_some(), "clear bumps lastModified");
    }

    #[test]
    fn test_clear_then_append_yields_single_stroke() {
        let store = SessionStore::new();
        store.clear();
        store.append(dot(7.0, 7.0));

        let snapshot = store.snapshot();
        assert_eq!(snapshot.strokes.len(), 1);
        assert!((snapshot.strokes[0].points[0].x - 7.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_snapshot_is_detached_copy() {
        let store = SessionStore::new();
        store.append(dot(1.0, 1.0));

        let before = store.snapshot();
        store.append(dot(2.0, 2.0));

        assert_eq!(before.strokes.len(), 1);
        assert_eq!(store.snapshot().strokes.len(), 2);
    }

    #[test]
    fn test_participant_registry() {
        let store = SessionStore::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        assert_eq!(store.add_participant(a), 1);
        assert_eq!(store.add_participant(b), 2);
        assert_eq!(store.participant_count(), 2);

        assert_eq!(store.remove_participant(a), 1);
        assert_eq!(store.remove_participant(a), 1, "double remove is a no-op");
        assert_eq!(store.remove_participant(b), 0);
    }

    #[test]
    fn test_snapshot_serializes_legacy_field_names() {
        let snapshot = SessionSnapshot::empty();
        let json = serde_json::to_string(&snapshot).expect("should serialize");
        assert!(json.contains("\"lastModified\":null"));
        assert!(json.contains("\"strokes\":[]"));
    }
}
