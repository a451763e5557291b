//! Tool selection and the drawing gesture state machine.
//!
//! A gesture runs in normalized page coordinates from pointer-down to
//! pointer-up. Ending it yields a `GestureOutcome` describing what (if
//! anything) the host should commit to the document controller.

use crate::model::{Annotation, AnnotationKind, Color, FormFieldKind, RedactionArea};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// The active tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    Select,
    Eraser,
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
    Redaction,
    FormText,
    FormCheckbox,
    FormDropdown,
    FormRadio,
    FormSignature,
}

impl ToolKind {
    /// The annotation kind a drawing tool produces, if any.
    pub fn annotation_kind(&self) -> Option<AnnotationKind> {
        match self {
            ToolKind::Highlight => Some(AnnotationKind::Highlight),
            ToolKind::Underline => Some(AnnotationKind::Underline),
            ToolKind::Strikethrough => Some(AnnotationKind::Strikethrough),
            ToolKind::Rectangle => Some(AnnotationKind::Rectangle),
            ToolKind::Ellipse => Some(AnnotationKind::Ellipse),
            ToolKind::Arrow => Some(AnnotationKind::Arrow),
            ToolKind::Line => Some(AnnotationKind::Line),
            ToolKind::Freehand => Some(AnnotationKind::Freehand),
            _ => None,
        }
    }

    /// The form field kind a form tool places, if any.
    pub fn form_field_kind(&self) -> Option<FormFieldKind> {
        match self {
            ToolKind::FormText => Some(FormFieldKind::Text),
            ToolKind::FormCheckbox => Some(FormFieldKind::Checkbox),
            ToolKind::FormDropdown => Some(FormFieldKind::Dropdown),
            ToolKind::FormRadio => Some(FormFieldKind::Radio),
            ToolKind::FormSignature => Some(FormFieldKind::Signature),
            _ => None,
        }
    }
}

/// Stroke style applied to annotations a gesture produces.
#[derive(Debug, Clone, Copy)]
pub struct ToolStyle {
    pub color: Color,
    pub stroke_width: f64,
}

impl Default for ToolStyle {
    fn default() -> Self {
        Self {
            color: Color::new(255, 255, 0, 255),
            stroke_width: 0.002,
        }
    }
}

/// What ending a gesture asks the host to do.
#[derive(Debug, Clone)]
pub enum GestureOutcome {
    /// Commit a finished annotation.
    Annotation(Annotation),
    /// Commit a redaction area.
    Redaction(RedactionArea),
    /// Open the form-field configuration flow for this rectangle.
    FormFieldRequest {
        kind: FormFieldKind,
        page: u32,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    /// Open an inline text editor at this point.
    TextInsert { kind: AnnotationKind, at: Point },
    /// Nothing to commit (degenerate gesture, select/eraser tool).
    Nothing,
}

/// Pointer gesture over a page.
#[derive(Debug, Clone, Default)]
pub enum ToolGesture {
    #[default]
    Idle,
    Active {
        page: u32,
        start: Point,
        current: Point,
        /// Every point seen, for freehand strokes.
        path: Vec<Point>,
    },
}

impl ToolGesture {
    pub fn is_active(&self) -> bool {
        matches!(self, ToolGesture::Active { .. })
    }

    /// Pointer down: start tracking. Points arrive already normalized.
    pub fn begin(&mut self, page: u32, at: Point) {
        *self = ToolGesture::Active {
            page,
            start: at,
            current: at,
            path: vec![at],
        };
    }

    /// Pointer move while down.
    pub fn update(&mut self, at: Point) {
        if let ToolGesture::Active { current, path, .. } = self {
            *current = at;
            path.push(at);
        }
    }

    /// Abort without producing anything (Escape, pointer capture lost).
    pub fn cancel(&mut self) {
        *self = ToolGesture::Idle;
    }

    /// Pointer up: finish the gesture and describe what it produced.
    pub fn end(&mut self, tool: ToolKind, style: ToolStyle) -> GestureOutcome {
        let ToolGesture::Active {
            page,
            start,
            current,
            path,
        } = std::mem::take(self)
        else {
            return GestureOutcome::Nothing;
        };

        let (x, y, width, height) = bounding_box(start, current);

        match tool {
            ToolKind::Select | ToolKind::Eraser => GestureOutcome::Nothing,

            ToolKind::Text => GestureOutcome::TextInsert {
                kind: AnnotationKind::Text,
                at: start,
            },
            ToolKind::StickyNote => GestureOutcome::TextInsert {
                kind: AnnotationKind::StickyNote,
                at: start,
            },

            ToolKind::Redaction => {
                GestureOutcome::Redaction(RedactionArea::new(page, x, y, width, height))
            }

            ToolKind::Freehand => {
                // A click with no movement is not a stroke.
                if path.len() < 2 {
                    return GestureOutcome::Nothing;
                }
                let mut ann = Annotation::new(AnnotationKind::Freehand, page, x, y)
                    .with_size(width, height)
                    .with_color(style.color);
                ann.stroke_width = Some(style.stroke_width);
                ann.path = Some(path);
                GestureOutcome::Annotation(ann)
            }

            ToolKind::FormText
            | ToolKind::FormCheckbox
            | ToolKind::FormDropdown
            | ToolKind::FormRadio
            | ToolKind::FormSignature => {
                let kind = match tool.form_field_kind() {
                    Some(kind) => kind,
                    None => return GestureOutcome::Nothing,
                };
                GestureOutcome::FormFieldRequest {
                    kind,
                    page,
                    x,
                    y,
                    width,
                    height,
                }
            }

            _ => {
                let kind = match tool.annotation_kind() {
                    Some(kind) => kind,
                    None => return GestureOutcome::Nothing,
                };
                let mut ann = Annotation::new(kind, page, x, y)
                    .with_size(width, height)
                    .with_color(style.color);
                // Text markup reads through; shapes draw at full strength.
                ann.opacity = if kind == AnnotationKind::Highlight {
                    0.3
                } else {
                    1.0
                };
                ann.stroke_width = Some(style.stroke_width);
                GestureOutcome::Annotation(ann)
            }
        }
    }
}

fn bounding_box(a: Point, b: Point) -> (f64, f64, f64, f64) {
    let x = a.x.min(b.x);
    let y = a.y.min(b.y);
    (x, y, (a.x - b.x).abs(), (a.y - b.y).abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drag(gesture: &mut ToolGesture, from: Point, to: Point) {
        gesture.begin(1, from);
        gesture.update(to);
    }

    #[test]
    fn test_highlight_gesture_scenario() {
        let mut gesture = ToolGesture::default();
        drag(&mut gesture, Point::new(0.1, 0.1), Point::new(0.4, 0.2));
        let style = ToolStyle {
            color: Color::from_hex("#ffff00"),
            stroke_width: 0.002,
        };
        let outcome = gesture.end(ToolKind::Highlight, style);
        let GestureOutcome::Annotation(ann) = outcome else {
            panic!("expected annotation");
        };
        assert_eq!(ann.kind, AnnotationKind::Highlight);
        assert!((ann.x - 0.1).abs() < 1e-9);
        assert!((ann.y - 0.1).abs() < 1e-9);
        assert!((ann.width.unwrap() - 0.3).abs() < 1e-9);
        assert!((ann.height.unwrap() - 0.1).abs() < 1e-9);
        assert_eq!(ann.color.to_hex(), "#ffff00");
        assert!((ann.opacity - 0.3).abs() < 1e-9);
        assert!(!gesture.is_active());
    }

    #[test]
    fn test_shape_opacity_is_full() {
        let mut gesture = ToolGesture::default();
        drag(&mut gesture, Point::new(0.2, 0.2), Point::new(0.5, 0.5));
        let GestureOutcome::Annotation(ann) = gesture.end(ToolKind::Rectangle, ToolStyle::default())
        else {
            panic!("expected annotation");
        };
        assert_eq!(ann.opacity, 1.0);
    }

    #[test]
    fn test_reversed_drag_normalizes_box() {
        let mut gesture = ToolGesture::default();
        drag(&mut gesture, Point::new(0.6, 0.7), Point::new(0.2, 0.3));
        let GestureOutcome::Annotation(ann) = gesture.end(ToolKind::Ellipse, ToolStyle::default())
        else {
            panic!("expected annotation");
        };
        assert!((ann.x - 0.2).abs() < 1e-9);
        assert!((ann.y - 0.3).abs() < 1e-9);
        assert!((ann.width.unwrap() - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_freehand_click_discarded() {
        let mut gesture = ToolGesture::default();
        gesture.begin(1, Point::new(0.5, 0.5));
        let outcome = gesture.end(ToolKind::Freehand, ToolStyle::default());
        assert!(matches!(outcome, GestureOutcome::Nothing));
    }

    #[test]
    fn test_freehand_keeps_path() {
        let mut gesture = ToolGesture::default();
        gesture.begin(1, Point::new(0.1, 0.1));
        gesture.update(Point::new(0.2, 0.15));
        gesture.update(Point::new(0.3, 0.1));
        let GestureOutcome::Annotation(ann) = gesture.end(ToolKind::Freehand, ToolStyle::default())
        else {
            panic!("expected annotation");
        };
        assert_eq!(ann.kind, AnnotationKind::Freehand);
        assert_eq!(ann.path.as_ref().unwrap().len(), 3);
    }

    #[test]
    fn test_text_tool_requests_insert() {
        let mut gesture = ToolGesture::default();
        gesture.begin(1, Point::new(0.3, 0.4));
        let outcome = gesture.end(ToolKind::Text, ToolStyle::default());
        let GestureOutcome::TextInsert { kind, at } = outcome else {
            panic!("expected text insert");
        };
        assert_eq!(kind, AnnotationKind::Text);
        assert_eq!(at, Point::new(0.3, 0.4));
    }

    #[test]
    fn test_form_tool_requests_configuration() {
        let mut gesture = ToolGesture::default();
        drag(&mut gesture, Point::new(0.1, 0.1), Point::new(0.3, 0.15));
        let outcome = gesture.end(ToolKind::FormCheckbox, ToolStyle::default());
        let GestureOutcome::FormFieldRequest { kind, width, .. } = outcome else {
            panic!("expected form field request");
        };
        assert_eq!(kind, FormFieldKind::Checkbox);
        assert!((width - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_redaction_tool() {
        let mut gesture = ToolGesture::default();
        drag(&mut gesture, Point::new(0.0, 0.0), Point::new(0.5, 0.5));
        let outcome = gesture.end(ToolKind::Redaction, ToolStyle::default());
        assert!(matches!(outcome, GestureOutcome::Redaction(_)));
    }

    #[test]
    fn test_cancel_discards() {
        let mut gesture = ToolGesture::default();
        gesture.begin(1, Point::new(0.1, 0.1));
        gesture.cancel();
        assert!(!gesture.is_active());
        let outcome = gesture.end(ToolKind::Rectangle, ToolStyle::default());
        assert!(matches!(outcome, GestureOutcome::Nothing));
    }
}
