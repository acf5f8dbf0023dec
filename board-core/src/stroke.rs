//! Stroke model - the atomic unit of drawing history.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::StrokeError;

/// A raster coordinate. Immutable once recorded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X position (pixels from left).
    pub x: f32,
    /// Y position (pixels from top).
    pub y: f32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Drawing tool carried by a stroke.
///
/// Unknown tool names fail deserialization; tool validity is enforced at the
/// trust boundary, not inside the replay engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Paints with the stroke's color.
    Brush,
    /// Removes paint along the path.
    Eraser,
}

/// Brush style for a stroke path.
///
/// The legacy client stored free-form style strings, including `"eraser"` on
/// brush strokes and pen styles this version no longer ships. Unrecognized
/// names map to [`StrokeStyle::Legacy`] and render as solid polylines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrokeStyle {
    /// Continuous line.
    #[default]
    Solid,
    /// Uniform 5-on/5-off dash pattern.
    Dashed,
    /// Filled dots stamped along the path.
    Circle,
    /// Legacy marker: erase regardless of the stroke's tool.
    Eraser,
    /// Any other legacy style name; drawn as a solid line.
    Legacy,
}

impl StrokeStyle {
    /// Parse a wire style name, mapping unknown names to [`Self::Legacy`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "solid" => Self::Solid,
            "dashed" => Self::Dashed,
            "circle" => Self::Circle,
            "eraser" => Self::Eraser,
            _ => Self::Legacy,
        }
    }

    /// The wire name of this style.
    #[must_use]
    pub const fn as_name(self) -> &'static str {
        match self {
            Self::Solid => "solid",
            Self::Dashed => "dashed",
            Self::Circle => "circle",
            Self::Eraser => "eraser",
            Self::Legacy => "legacy",
        }
    }
}

impl Serialize for StrokeStyle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_name())
    }
}

impl<'de> Deserialize<'de> for StrokeStyle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from_name(&name))
    }
}

/// One complete drawing gesture, treated as an atomic history unit.
///
/// Strokes are immutable after construction: the session log only ever
/// appends them or replaces the whole log on clear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    /// Tool that produced the stroke.
    pub tool: Tool,
    /// Path points in drawing order.
    pub points: Vec<Point>,
    /// Stroke color as a hex string; meaningful only for brush strokes.
    #[serde(default = "default_color")]
    pub color: String,
    /// Line width, or erase radius for eraser strokes.
    pub size: f32,
    /// Brush style; eraser strokes ignore it.
    #[serde(default)]
    pub style: StrokeStyle,
    /// Legacy alpha override in `[0, 1]`. Absent means fully opaque.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
}

fn default_color() -> String {
    "#000000".to_string()
}

impl Stroke {
    /// Create a brush stroke.
    #[must_use]
    pub fn brush(points: Vec<Point>, color: impl Into<String>, size: f32) -> Self {
        Self {
            tool: Tool::Brush,
            points,
            color: color.into(),
            size,
            style: StrokeStyle::Solid,
            opacity: None,
        }
    }

    /// Create an eraser stroke.
    #[must_use]
    pub fn eraser(points: Vec<Point>, size: f32) -> Self {
        Self {
            tool: Tool::Eraser,
            points,
            color: default_color(),
            size,
            style: StrokeStyle::Solid,
            opacity: None,
        }
    }

    /// Set the brush style.
    #[must_use]
    pub fn with_style(mut self, style: StrokeStyle) -> Self {
        self.style = style;
        self
    }

    /// Set the legacy opacity override.
    #[must_use]
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = Some(opacity);
        self
    }

    /// Whether this stroke erases rather than paints.
    ///
    /// Legacy files marked some eraser strokes via `style` instead of `tool`;
    /// both spellings must erase.
    #[must_use]
    pub fn is_eraser(&self) -> bool {
        self.tool == Tool::Eraser || self.style == StrokeStyle::Eraser
    }

    /// Validate the stroke at the trust boundary.
    ///
    /// Structural checks only; a structurally valid stroke is never rejected
    /// on content.
    ///
    /// # Errors
    ///
    /// Returns [`StrokeError::EmptyPoints`] if the path is empty.
    pub fn validate(&self) -> Result<(), StrokeError> {
        if self.points.is_empty() {
            return Err(StrokeError::EmptyPoints);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance(b) - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_style_from_name_known() {
        assert_eq!(StrokeStyle::from_name("solid"), StrokeStyle::Solid);
        assert_eq!(StrokeStyle::from_name("dashed"), StrokeStyle::Dashed);
        assert_eq!(StrokeStyle::from_name("circle"), StrokeStyle::Circle);
        assert_eq!(StrokeStyle::from_name("eraser"), StrokeStyle::Eraser);
    }

    #[test]
    fn test_style_from_name_legacy_fallback() {
        assert_eq!(StrokeStyle::from_name("pencil"), StrokeStyle::Legacy);
        assert_eq!(StrokeStyle::from_name("pen"), StrokeStyle::Legacy);
        assert_eq!(StrokeStyle::from_name(""), StrokeStyle::Legacy);
    }

    #[test]
    fn test_stroke_parses_minimal_payload() {
        let json = r##"{"tool":"brush","points":[{"x":1.0,"y":2.0}],"size":4.0}"##;
        let stroke: Stroke = serde_json::from_str(json).expect("should parse");
        assert_eq!(stroke.tool, Tool::Brush);
        assert_eq!(stroke.color, "#000000");
        assert_eq!(stroke.style, StrokeStyle::Solid);
        assert!(stroke.opacity.is_none());
    }

    #[test]
    fn test_stroke_parses_legacy_style() {
        let json = r##"{"tool":"brush","points":[{"x":0,"y":0}],"color":"#ff0000","size":2.0,"style":"pencil","opacity":0.5}"##;
        let stroke: Stroke = serde_json::from_str(json).expect("should parse");
        assert_eq!(stroke.style, StrokeStyle::Legacy);
        let opacity = stroke.opacity.expect("opacity present");
        assert!((opacity - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_stroke_rejects_unknown_tool() {
        let json = r##"{"tool":"sprayer","points":[{"x":0,"y":0}],"size":2.0}"##;
        assert!(serde_json::from_str::<Stroke>(json).is_err());
    }

    #[test]
    fn test_stroke_rejects_non_array_points() {
        let json = r##"{"tool":"brush","points":"oops","size":2.0}"##;
        assert!(serde_json::from_str::<Stroke>(json).is_err());
    }

    #[test]
    fn test_validate_empty_points() {
        let stroke = Stroke::brush(Vec::new(), "#000000", 4.0);
        assert!(matches!(stroke.validate(), Err(StrokeError::EmptyPoints)));
    }

    #[test]
    fn test_validate_single_point_is_ok() {
        let stroke = Stroke::brush(vec![Point::new(5.0, 5.0)], "#000000", 4.0);
        assert!(stroke.validate().is_ok());
    }

    #[test]
    fn test_is_eraser_via_tool_or_style() {
        let by_tool = Stroke::eraser(vec![Point::new(0.0, 0.0)], 10.0);
        assert!(by_tool.is_eraser());

        let by_style = Stroke::brush(vec![Point::new(0.0, 0.0)], "#123456", 3.0)
            .with_style(StrokeStyle::Eraser);
        assert!(by_style.is_eraser());

        let plain = Stroke::brush(vec![Point::new(0.0, 0.0)], "#123456", 3.0);
        assert!(!plain.is_eraser());
    }

    #[test]
    fn test_style_serializes_as_wire_name() {
        let stroke = Stroke::brush(vec![Point::new(0.0, 0.0)], "#000", 1.0)
            .with_style(StrokeStyle::Dashed);
        let json = serde_json::to_string(&stroke).expect("should serialize");
        assert!(json.contains("\"style\":\"dashed\""));
    }
}
