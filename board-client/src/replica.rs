//! Local canvas replica.
//!
//! Each client owns its own surface and stroke history, derived entirely
//! from the authoritative session log plus a local background image. Local
//! drawing renders optimistically before any network round-trip;
//! network-sourced events render whenever they arrive.

use board_core::message::ServerMessage;
use board_core::stroke::{Point, Stroke, StrokeStyle, Tool};
use board_render::{render_segment, render_session, render_stroke, Background, Pen, Surface};

/// Default erase width when the application has not configured one.
const DEFAULT_ERASER_SIZE: f32 = 20.0;

/// A stroke currently being drawn by the local participant.
#[derive(Debug, Clone)]
struct ActiveStroke {
    pen: Pen,
    points: Vec<Point>,
}

/// Client-side mirror of the shared board.
///
/// [`BoardReplica::apply`] is the dispatch table for server events; it must
/// tolerate events arriving out of causal order relative to local actions
/// still in flight, which works because local actions always render
/// optimistically first and full resyncs replace history wholesale.
#[derive(Debug)]
pub struct BoardReplica {
    surface: Surface,
    background: Option<Background>,
    history: Vec<Stroke>,
    peer_count: usize,
    eraser_size: f32,
    active: Option<ActiveStroke>,
}

impl BoardReplica {
    /// Create a replica with a transparent surface of the given size.
    ///
    /// # Errors
    ///
    /// Returns a render error if the surface cannot be allocated.
    pub fn new(width: u32, height: u32) -> Result<Self, board_render::RenderError> {
        Ok(Self {
            surface: Surface::new(width, height)?,
            background: None,
            history: Vec::new(),
            peer_count: 0,
            eraser_size: DEFAULT_ERASER_SIZE,
            active: None,
        })
    }

    /// Replace the background image and redraw everything over it.
    pub fn set_background(&mut self, background: Option<Background>) {
        self.background = background;
        self.redraw();
    }

    /// Set the erase width used for live eraser segments and finished
    /// eraser strokes.
    pub fn set_eraser_size(&mut self, size: f32) {
        self.eraser_size = size;
    }

    /// The local stroke history, in replay order.
    #[must_use]
    pub fn history(&self) -> &[Stroke] {
        &self.history
    }

    /// Last observed participant count.
    #[must_use]
    pub fn peer_count(&self) -> usize {
        self.peer_count
    }

    /// The raster surface this replica draws onto.
    #[must_use]
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Apply one server event to the local state.
    pub fn apply(&mut self, message: &ServerMessage) {
        match message {
            ServerMessage::StrokeSubmit { stroke } => {
                // Render immediately, no buffering, and remember the stroke
                // for future full redraws.
                render_stroke(&mut self.surface, stroke);
                self.history.push(stroke.clone());
            }
            ServerMessage::ClearBroadcast => {
                tracing::debug!("clear received, truncating local history");
                self.history.clear();
                self.redraw();
            }
            ServerMessage::SyncState { state } => {
                // Authoritative replacement; no diffing or merging.
                tracing::debug!(strokes = state.strokes.len(), "full state sync");
                self.history = state.strokes.clone();
                self.redraw();
            }
            ServerMessage::UserJoin { user_count, .. }
            | ServerMessage::UserLeave { user_count, .. } => {
                self.peer_count = *user_count;
            }
            ServerMessage::UserCount { count } => {
                self.peer_count = *count;
            }
        }
    }

    /// Start a local stroke at the given point.
    pub fn begin_stroke(&mut self, pen: Pen, at: Point) {
        self.active = Some(ActiveStroke {
            pen,
            points: vec![at],
        });
    }

    /// Extend the active stroke, rendering the new segment immediately.
    pub fn extend_stroke(&mut self, to: Point) {
        let eraser_size = self.eraser_size;
        if let Some(active) = &mut self.active {
            if let Some(&from) = active.points.last() {
                render_segment(&mut self.surface, from, to, &active.pen, || eraser_size);
            }
            active.points.push(to);
        }
    }

    /// Finish the active stroke and return it for submission.
    ///
    /// The stroke has already been rendered locally segment by segment; the
    /// caller only needs to send it.
    pub fn finish_stroke(&mut self) -> Option<Stroke> {
        let active = self.active.take()?;
        let stroke = match active.pen.tool {
            Tool::Eraser => Stroke::eraser(active.points, self.eraser_size),
            Tool::Brush => {
                Stroke::brush(active.points, active.pen.color.clone(), active.pen.size)
                    .with_style(active.pen.style)
            }
        };
        self.history.push(stroke.clone());
        Some(stroke)
    }

    /// Full redraw from background plus history.
    fn redraw(&mut self) {
        render_session(&mut self.surface, self.background.as_ref(), &self.history);
    }
}

/// Convenience: a default solid brush pen.
#[must_use]
pub fn default_pen() -> Pen {
    Pen::brush("#000000", 4.0, StrokeStyle::Solid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use board_core::session::SessionSnapshot;
    use uuid::Uuid;

    fn line(x0: f32, x1: f32, y: f32) -> Stroke {
        Stroke::brush(vec![Point::new(x0, y), Point::new(x1, y)], "#ff0000", 4.0)
    }

    #[test]
    fn test_relayed_stroke_renders_and_appends() {
        let mut replica = BoardReplica::new(100, 100).expect("replica");
        replica.apply(&ServerMessage::StrokeSubmit {
            stroke: line(10.0, 90.0, 50.0),
        });

        assert_eq!(replica.history().len(), 1);
        assert_eq!(replica.surface().alpha_at(50, 50), Some(255));
    }

    #[test]
    fn test_clear_truncates_history_and_surface() {
        let mut replica = BoardReplica::new(100, 100).expect("replica");
        replica.apply(&ServerMessage::StrokeSubmit {
            stroke: line(10.0, 90.0, 50.0),
        });

        replica.apply(&ServerMessage::ClearBroadcast);

        assert!(replica.history().is_empty());
        assert_eq!(replica.surface().alpha_at(50, 50), Some(0));
    }

    #[test]
    fn test_sync_state_replaces_history_wholesale() {
        let mut replica = BoardReplica::new(100, 100).expect("replica");
        replica.apply(&ServerMessage::StrokeSubmit {
            stroke: line(10.0, 90.0, 20.0),
        });

        let authoritative = SessionSnapshot {
            strokes: vec![line(10.0, 90.0, 70.0)],
            last_modified: Some(123),
        };
        replica.apply(&ServerMessage::SyncState {
            state: authoritative,
        });

        assert_eq!(replica.history().len(), 1, "local history replaced");
        assert_eq!(replica.surface().alpha_at(50, 70), Some(255));
        assert_eq!(
            replica.surface().alpha_at(50, 20),
            Some(0),
            "pre-sync stroke is gone"
        );
    }

    #[test]
    fn test_user_events_update_peer_count() {
        let mut replica = BoardReplica::new(10, 10).expect("replica");

        replica.apply(&ServerMessage::UserJoin {
            user_id: Uuid::new_v4(),
            user_count: 3,
        });
        assert_eq!(replica.peer_count(), 3);

        replica.apply(&ServerMessage::UserLeave {
            user_id: Uuid::new_v4(),
            user_count: 2,
        });
        assert_eq!(replica.peer_count(), 2);

        replica.apply(&ServerMessage::UserCount { count: 5 });
        assert_eq!(replica.peer_count(), 5);
    }

    #[test]
    fn test_local_drawing_renders_optimistically() {
        let mut replica = BoardReplica::new(100, 100).expect("replica");
        replica.begin_stroke(default_pen(), Point::new(20.0, 50.0));
        replica.extend_stroke(Point::new(80.0, 50.0));

        // Rendered before any submission or acknowledgment.
        assert_eq!(replica.surface().alpha_at(50, 50), Some(255));

        let stroke = replica.finish_stroke().expect("stroke");
        assert_eq!(stroke.points.len(), 2);
        assert_eq!(replica.history().len(), 1);
    }

    #[test]
    fn test_finish_eraser_stroke_records_erase_width() {
        let mut replica = BoardReplica::new(100, 100).expect("replica");
        replica.set_eraser_size(32.0);

        replica.begin_stroke(Pen::eraser(), Point::new(10.0, 10.0));
        replica.extend_stroke(Point::new(20.0, 20.0));
        let stroke = replica.finish_stroke().expect("stroke");

        assert_eq!(stroke.tool, Tool::Eraser);
        assert!((stroke.size - 32.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_finish_without_begin_is_none() {
        let mut replica = BoardReplica::new(10, 10).expect("replica");
        assert!(replica.finish_stroke().is_none());
    }

    #[test]
    fn test_single_tap_produces_single_point_stroke() {
        let mut replica = BoardReplica::new(100, 100).expect("replica");
        replica.begin_stroke(default_pen(), Point::new(50.0, 50.0));
        let stroke = replica.finish_stroke().expect("stroke");
        assert_eq!(stroke.points.len(), 1);
    }
}
