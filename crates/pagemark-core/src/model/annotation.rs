//! Annotation records anchored to document pages.

use super::color::Color;
use super::now_millis;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for annotations.
pub type AnnotationId = Uuid;

/// Bounding-box extent assumed for annotations that carry no explicit
/// width/height (text insertion points, stamps placed by click).
pub const DEFAULT_HIT_EXTENT: f64 = 0.05;

/// The kind of mark an annotation represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationKind {
    Highlight,
    Underline,
    Strikethrough,
    Rectangle,
    Ellipse,
    Arrow,
    Line,
    Freehand,
    Text,
    StickyNote,
    Signature,
    Stamp,
    Image,
}

impl AnnotationKind {
    /// Whether this kind carries raster image data.
    pub fn is_image(&self) -> bool {
        matches!(
            self,
            AnnotationKind::Signature | AnnotationKind::Stamp | AnnotationKind::Image
        )
    }

    /// Whether this kind is anchored to selected text (quad lists).
    pub fn is_text_markup(&self) -> bool {
        matches!(
            self,
            AnnotationKind::Highlight | AnnotationKind::Underline | AnnotationKind::Strikethrough
        )
    }
}

/// A user-drawn or inserted mark anchored to a page.
///
/// All geometry is in normalized page coordinates: `x`, `y`, `width`,
/// `height` and every path/quad point are fractions (0-1) of the page
/// dimensions, independent of zoom.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Annotation {
    pub id: AnnotationId,
    pub kind: AnnotationKind,
    /// 1-based page number.
    pub page: u32,
    /// Top-left corner, normalized.
    pub x: f64,
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    pub color: Color,
    pub opacity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    /// Text content for text/sticky-note annotations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Captured point path for freehand strokes (normalized).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<Point>>,
    /// Base64-encoded image payload for signature/stamp/image kinds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
    /// Quads covering selected text for text-markup kinds (normalized).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_quads: Option<Vec<Rect>>,
    /// Creation timestamp, unix millis.
    pub created_at: i64,
    /// Last-modified timestamp, unix millis.
    pub updated_at: i64,
}

impl Annotation {
    /// Create a new annotation at a normalized position.
    pub fn new(kind: AnnotationKind, page: u32, x: f64, y: f64) -> Self {
        let now = now_millis();
        Self {
            id: Uuid::new_v4(),
            kind,
            page,
            x,
            y,
            width: None,
            height: None,
            color: Color::black(),
            opacity: 1.0,
            stroke_width: None,
            content: None,
            path: None,
            image_data: None,
            text_quads: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Builder-style size setter.
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Builder-style color setter.
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Effective width used for hit-testing and drag clamping.
    pub fn extent_width(&self) -> f64 {
        self.width.unwrap_or(DEFAULT_HIT_EXTENT)
    }

    /// Effective height used for hit-testing and drag clamping.
    pub fn extent_height(&self) -> f64 {
        self.height.unwrap_or(DEFAULT_HIT_EXTENT)
    }

    /// Bounding box in normalized coordinates.
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.x,
            self.y,
            self.x + self.extent_width(),
            self.y + self.extent_height(),
        )
    }

    /// Check whether a normalized point falls inside the bounding box.
    pub fn hit_test(&self, point: Point) -> bool {
        self.bounds().contains(point)
    }

    /// Decode the base64 image payload, if present.
    pub fn image_bytes(&self) -> Option<Vec<u8>> {
        use base64::Engine as _;
        let data = self.image_data.as_deref()?;
        base64::engine::general_purpose::STANDARD.decode(data).ok()
    }

    /// Stamp the last-modified timestamp.
    pub fn touch(&mut self) {
        self.updated_at = now_millis();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_with_explicit_size() {
        let ann = Annotation::new(AnnotationKind::Rectangle, 1, 0.1, 0.2).with_size(0.3, 0.4);
        let b = ann.bounds();
        assert!((b.x0 - 0.1).abs() < f64::EPSILON);
        assert!((b.x1 - 0.4).abs() < f64::EPSILON);
        assert!((b.y1 - 0.6).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bounds_default_extent() {
        let ann = Annotation::new(AnnotationKind::Text, 1, 0.5, 0.5);
        let b = ann.bounds();
        assert!((b.width() - DEFAULT_HIT_EXTENT).abs() < f64::EPSILON);
        assert!((b.height() - DEFAULT_HIT_EXTENT).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hit_test() {
        let ann = Annotation::new(AnnotationKind::Rectangle, 1, 0.1, 0.1).with_size(0.2, 0.2);
        assert!(ann.hit_test(Point::new(0.2, 0.2)));
        assert!(!ann.hit_test(Point::new(0.5, 0.5)));
    }

    #[test]
    fn test_image_bytes_roundtrip() {
        use base64::Engine as _;
        let payload = b"fake png bytes";
        let mut ann = Annotation::new(AnnotationKind::Stamp, 1, 0.0, 0.0);
        ann.image_data = Some(base64::engine::general_purpose::STANDARD.encode(payload));
        assert_eq!(ann.image_bytes().unwrap(), payload);
    }

    #[test]
    fn test_serde_roundtrip() {
        let ann = Annotation::new(AnnotationKind::Highlight, 2, 0.1, 0.1)
            .with_size(0.3, 0.1)
            .with_color(Color::from_hex("#ffff00"));
        let json = serde_json::to_string(&ann).unwrap();
        let back: Annotation = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, ann.id);
        assert_eq!(back.kind, AnnotationKind::Highlight);
        assert_eq!(back.page, 2);
    }
}
