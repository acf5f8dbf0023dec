//! Deterministic stroke replay.
//!
//! Two distinct code paths exist on purpose:
//!
//! - [`render_segment`] is the live path: while a participant is dragging,
//!   each new segment is drawn immediately, and circle-style segments are
//!   stamped at unit-pixel intervals.
//! - [`render_stroke`] is the historical path: a completed stroke replayed
//!   from the log. Circle-style strokes stamp one dot per *recorded* point
//!   with no interpolation, which is coarser than the live path and is an
//!   accepted characteristic of replay.
//!
//! All render state (color, blend mode, dash, width) is built per call, so
//! one stroke's styling can never leak into the next.

use board_core::stroke::{Point, Stroke, StrokeStyle, Tool};
use tiny_skia::{
    BlendMode, Color, FillRule, LineCap, LineJoin, Paint, Path, PathBuilder,
    Stroke as LineAttrs, StrokeDash, Transform,
};

use crate::background::Background;
use crate::surface::Surface;

/// Dash pattern length in raster units: 5 on, 5 off.
const DASH_LENGTH: f32 = 5.0;

/// Live drawing parameters for one participant's pen.
#[derive(Debug, Clone)]
pub struct Pen {
    /// Active tool.
    pub tool: Tool,
    /// Brush color as a hex string.
    pub color: String,
    /// Brush line width.
    pub size: f32,
    /// Brush style.
    pub style: StrokeStyle,
}

impl Pen {
    /// A brush pen with the given color, width, and style.
    #[must_use]
    pub fn brush(color: impl Into<String>, size: f32, style: StrokeStyle) -> Self {
        Self {
            tool: Tool::Brush,
            color: color.into(),
            size,
            style,
        }
    }

    /// An eraser pen. The erase width is resolved at draw time, not here.
    #[must_use]
    pub fn eraser() -> Self {
        Self {
            tool: Tool::Eraser,
            color: String::new(),
            size: 0.0,
            style: StrokeStyle::Solid,
        }
    }
}

/// Replay one completed stroke from the log onto the surface.
pub fn render_stroke(surface: &mut Surface, stroke: &Stroke) {
    if stroke.points.is_empty() {
        return;
    }

    if stroke.is_eraser() {
        // Erasers ignore color, dash, and opacity: solid transparent cut
        // with round caps, width taken from the recorded size.
        if let Some(path) = polyline_path(&stroke.points) {
            surface.pixmap_mut().stroke_path(
                &path,
                &eraser_paint(),
                &line_attrs(stroke.size, None),
                Transform::identity(),
                None,
            );
        }
        return;
    }

    let color = brush_color(&stroke.color, stroke.opacity);

    match stroke.style {
        StrokeStyle::Circle => {
            for point in &stroke.points {
                stamp_circle(surface, *point, stroke.size / 2.0, color);
            }
        }
        StrokeStyle::Dashed => {
            if let Some(path) = polyline_path(&stroke.points) {
                surface.pixmap_mut().stroke_path(
                    &path,
                    &brush_paint(color),
                    &line_attrs(stroke.size, dash_pattern()),
                    Transform::identity(),
                    None,
                );
            }
        }
        // Solid, plus legacy styles that only ever meant "a plain line".
        StrokeStyle::Solid | StrokeStyle::Legacy | StrokeStyle::Eraser => {
            if let Some(path) = polyline_path(&stroke.points) {
                surface.pixmap_mut().stroke_path(
                    &path,
                    &brush_paint(color),
                    &line_attrs(stroke.size, None),
                    Transform::identity(),
                    None,
                );
            }
        }
    }
}

/// Draw one live segment between two sampled pointer positions.
///
/// `eraser_size` resolves the erase width on demand; the legacy client
/// computed this instead of recording it on the pen.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn render_segment(
    surface: &mut Surface,
    from: Point,
    to: Point,
    pen: &Pen,
    eraser_size: impl Fn() -> f32,
) {
    if pen.tool == Tool::Eraser {
        if let Some(path) = segment_path(from, to) {
            surface.pixmap_mut().stroke_path(
                &path,
                &eraser_paint(),
                &line_attrs(eraser_size(), None),
                Transform::identity(),
                None,
            );
        }
        return;
    }

    let color = brush_color(&pen.color, None);

    match pen.style {
        StrokeStyle::Circle => {
            // Stamp at unit-pixel intervals so fast pointer moves still leave
            // a continuous dotted trail; a zero-length tap stamps one dot.
            let steps = from.distance(to).ceil() as usize;
            for i in 0..=steps {
                let t = if steps == 0 { 0.0 } else { i as f32 / steps as f32 };
                let center = Point::new(
                    (to.x - from.x).mul_add(t, from.x),
                    (to.y - from.y).mul_add(t, from.y),
                );
                stamp_circle(surface, center, pen.size / 2.0, color);
            }
        }
        StrokeStyle::Dashed => {
            if let Some(path) = segment_path(from, to) {
                surface.pixmap_mut().stroke_path(
                    &path,
                    &brush_paint(color),
                    &line_attrs(pen.size, dash_pattern()),
                    Transform::identity(),
                    None,
                );
            }
        }
        StrokeStyle::Solid | StrokeStyle::Legacy | StrokeStyle::Eraser => {
            if let Some(path) = segment_path(from, to) {
                surface.pixmap_mut().stroke_path(
                    &path,
                    &brush_paint(color),
                    &line_attrs(pen.size, None),
                    Transform::identity(),
                    None,
                );
            }
        }
    }
}

/// Rebuild the full canvas: clear, draw the background (contain-fit), then
/// replay every stroke in log order.
///
/// Used for initial load and full resynchronization. Idempotent: identical
/// inputs produce bit-identical raster output.
pub fn render_session(surface: &mut Surface, background: Option<&Background>, strokes: &[Stroke]) {
    surface.clear();

    if let Some(background) = background {
        background.draw_contained(surface);
    }

    for stroke in strokes {
        render_stroke(surface, stroke);
    }
}

fn polyline_path(points: &[Point]) -> Option<Path> {
    // A lone move-to strokes nothing, same as the canvas it replaces.
    if points.len() < 2 {
        return None;
    }
    let mut pb = PathBuilder::new();
    pb.move_to(points[0].x, points[0].y);
    for point in &points[1..] {
        pb.line_to(point.x, point.y);
    }
    pb.finish()
}

fn segment_path(from: Point, to: Point) -> Option<Path> {
    let mut pb = PathBuilder::new();
    pb.move_to(from.x, from.y);
    pb.line_to(to.x, to.y);
    pb.finish()
}

fn stamp_circle(surface: &mut Surface, center: Point, radius: f32, color: Color) {
    let mut pb = PathBuilder::new();
    pb.push_circle(center.x, center.y, radius);
    if let Some(path) = pb.finish() {
        surface.pixmap_mut().fill_path(
            &path,
            &brush_paint(color),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }
}

fn line_attrs(width: f32, dash: Option<StrokeDash>) -> LineAttrs {
    LineAttrs {
        width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        dash,
        ..LineAttrs::default()
    }
}

/// Uniform dash pattern with the phase pinned to zero, so dash rendering is
/// reproducible regardless of what was drawn before.
fn dash_pattern() -> Option<StrokeDash> {
    StrokeDash::new(vec![DASH_LENGTH, DASH_LENGTH], 0.0)
}

fn brush_paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color);
    paint.anti_alias = true;
    paint
}

fn eraser_paint() -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(Color::BLACK);
    paint.anti_alias = true;
    // Destination-out: fully transparent wherever the path covers, no matter
    // what color sits underneath.
    paint.blend_mode = BlendMode::DestinationOut;
    paint
}

/// Resolve the paint color for a brush stroke, scaling alpha by the legacy
/// opacity override when present.
fn brush_color(hex: &str, opacity: Option<f32>) -> Color {
    let base = parse_hex_color(hex).unwrap_or_else(|| {
        tracing::warn!(color = %hex, "unparseable stroke color, falling back to black");
        Color::BLACK
    });

    match opacity {
        Some(opacity) => {
            let alpha = base.alpha() * opacity.clamp(0.0, 1.0);
            Color::from_rgba(base.red(), base.green(), base.blue(), alpha).unwrap_or(base)
        }
        None => base,
    }
}

/// Parse `#rgb`, `#rrggbb`, or `#rrggbbaa` hex color strings.
fn parse_hex_color(input: &str) -> Option<Color> {
    let hex = input.strip_prefix('#')?;
    match hex.len() {
        3 => {
            let r = u8::from_str_radix(&hex[0..1], 16).ok()?;
            let g = u8::from_str_radix(&hex[1..2], 16).ok()?;
            let b = u8::from_str_radix(&hex[2..3], 16).ok()?;
            Some(Color::from_rgba8(r * 17, g * 17, b * 17, 255))
        }
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Color::from_rgba8(r, g, b, 255))
        }
        8 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            let a = u8::from_str_radix(&hex[6..8], 16).ok()?;
            Some(Color::from_rgba8(r, g, b, a))
        }
        _ => None,
    }
}
