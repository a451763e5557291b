//! Draw command generation.
//!
//! The renderer is a pure function: annotation state and a viewport in,
//! a flat list of screen-space draw commands out. Hosts execute the list
//! against whatever surface they have; tests assert on the list itself.

use kurbo::{Point, Rect};
use pagemark_core::model::{Annotation, AnnotationId, AnnotationKind, Color, RedactionArea};
use pagemark_core::tools::{GestureOutcome, ToolGesture, ToolKind, ToolStyle};
use pagemark_core::interaction::ResizeHandle;
use pagemark_core::viewport::Viewport;

/// Side length of a selection handle, in screen pixels.
pub const HANDLE_SIZE: f64 = 8.0;
/// Underline/strikethrough stroke thickness, in screen pixels.
const MARKUP_STROKE: f64 = 2.0;

/// One screen-space drawing primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    FillRect {
        rect: Rect,
        color: Color,
        opacity: f64,
    },
    StrokeRect {
        rect: Rect,
        color: Color,
        width: f64,
        opacity: f64,
        dashed: bool,
    },
    StrokeEllipse {
        rect: Rect,
        color: Color,
        width: f64,
        opacity: f64,
    },
    Line {
        from: Point,
        to: Point,
        color: Color,
        width: f64,
        opacity: f64,
    },
    Polyline {
        points: Vec<Point>,
        color: Color,
        width: f64,
        opacity: f64,
    },
    FillPolygon {
        points: Vec<Point>,
        color: Color,
        opacity: f64,
    },
    ImageBlit {
        rect: Rect,
        /// Decoded image bytes (PNG or JPEG as stored).
        data: Vec<u8>,
    },
    TextRun {
        at: Point,
        text: String,
        color: Color,
        size: f64,
        opacity: f64,
    },
    HandleSquare {
        center: Point,
        size: f64,
    },
}

/// Build the draw list for one page.
///
/// Annotations render in insertion order (later on top), redactions over
/// them, selection chrome last.
pub fn page_display_list(
    annotations: &[Annotation],
    redactions: &[RedactionArea],
    selected: Option<AnnotationId>,
    page: u32,
    vp: &Viewport,
) -> Vec<DrawCmd> {
    let mut cmds = Vec::new();

    for ann in annotations.iter().filter(|a| a.page == page) {
        annotation_cmds(ann, vp, &mut cmds);
    }

    for red in redactions.iter().filter(|r| r.page == page) {
        let rect = Rect::new(red.x, red.y, red.x + red.width, red.y + red.height);
        cmds.push(DrawCmd::FillRect {
            rect: to_screen_rect(rect, vp),
            color: Color::black(),
            opacity: 1.0,
        });
    }

    if let Some(id) = selected {
        if let Some(ann) = annotations.iter().find(|a| a.id == id && a.page == page) {
            selection_cmds(ann, vp, &mut cmds);
        }
    }

    cmds
}

fn annotation_cmds(ann: &Annotation, vp: &Viewport, cmds: &mut Vec<DrawCmd>) {
    let screen = to_screen_rect(ann.bounds(), vp);
    let stroke = ann.stroke_width.map(|w| vp.scale_x(w)).unwrap_or(2.0);

    match ann.kind {
        AnnotationKind::Highlight => {
            for quad in markup_quads(ann) {
                cmds.push(DrawCmd::FillRect {
                    rect: to_screen_rect(quad, vp),
                    color: ann.color,
                    opacity: ann.opacity,
                });
            }
        }
        AnnotationKind::Underline => {
            for quad in markup_quads(ann) {
                let quad = to_screen_rect(quad, vp);
                cmds.push(DrawCmd::Line {
                    from: Point::new(quad.x0, quad.y1),
                    to: Point::new(quad.x1, quad.y1),
                    color: ann.color,
                    width: MARKUP_STROKE,
                    opacity: ann.opacity,
                });
            }
        }
        AnnotationKind::Strikethrough => {
            for quad in markup_quads(ann) {
                let quad = to_screen_rect(quad, vp);
                let mid = (quad.y0 + quad.y1) / 2.0;
                cmds.push(DrawCmd::Line {
                    from: Point::new(quad.x0, mid),
                    to: Point::new(quad.x1, mid),
                    color: ann.color,
                    width: MARKUP_STROKE,
                    opacity: ann.opacity,
                });
            }
        }
        AnnotationKind::Rectangle => {
            cmds.push(DrawCmd::StrokeRect {
                rect: screen,
                color: ann.color,
                width: stroke,
                opacity: ann.opacity,
                dashed: false,
            });
        }
        AnnotationKind::Ellipse => {
            cmds.push(DrawCmd::StrokeEllipse {
                rect: screen,
                color: ann.color,
                width: stroke,
                opacity: ann.opacity,
            });
        }
        AnnotationKind::Line => {
            cmds.push(DrawCmd::Line {
                from: Point::new(screen.x0, screen.y0),
                to: Point::new(screen.x1, screen.y1),
                color: ann.color,
                width: stroke,
                opacity: ann.opacity,
            });
        }
        AnnotationKind::Arrow => {
            let from = Point::new(screen.x0, screen.y0);
            let to = Point::new(screen.x1, screen.y1);
            cmds.push(DrawCmd::Line {
                from,
                to,
                color: ann.color,
                width: stroke,
                opacity: ann.opacity,
            });
            cmds.push(DrawCmd::FillPolygon {
                points: arrow_head(from, to),
                color: ann.color,
                opacity: ann.opacity,
            });
        }
        AnnotationKind::Freehand => {
            let Some(path) = &ann.path else {
                log::warn!("freehand annotation {} has no path", ann.id);
                return;
            };
            let points = path.iter().map(|p| vp.norm_to_screen(*p)).collect();
            cmds.push(DrawCmd::Polyline {
                points,
                color: ann.color,
                width: stroke,
                opacity: ann.opacity,
            });
        }
        AnnotationKind::Text => {
            cmds.push(DrawCmd::TextRun {
                at: Point::new(screen.x0, screen.y0),
                text: ann.content.clone().unwrap_or_default(),
                color: ann.color,
                size: 14.0 * vp.zoom,
                opacity: ann.opacity,
            });
        }
        AnnotationKind::StickyNote => {
            cmds.push(DrawCmd::FillRect {
                rect: screen,
                color: ann.color,
                opacity: ann.opacity,
            });
            cmds.push(DrawCmd::TextRun {
                at: Point::new(screen.x0 + 4.0, screen.y0 + 4.0),
                text: ann.content.clone().unwrap_or_default(),
                color: Color::black(),
                size: 12.0 * vp.zoom,
                opacity: 1.0,
            });
        }
        AnnotationKind::Signature | AnnotationKind::Stamp | AnnotationKind::Image => {
            match ann.image_bytes() {
                Some(data) => cmds.push(DrawCmd::ImageBlit { rect: screen, data }),
                None => {
                    log::warn!("image annotation {} has no decodable payload", ann.id);
                    // Placeholder box so the annotation stays visible and
                    // selectable.
                    cmds.push(DrawCmd::StrokeRect {
                        rect: screen,
                        color: Color::black(),
                        width: 1.0,
                        opacity: 0.5,
                        dashed: true,
                    });
                }
            }
        }
    }
}

fn selection_cmds(ann: &Annotation, vp: &Viewport, cmds: &mut Vec<DrawCmd>) {
    let bounds = ann.bounds();
    cmds.push(DrawCmd::StrokeRect {
        rect: to_screen_rect(bounds, vp),
        color: Color::new(0, 120, 255, 255),
        width: 1.0,
        opacity: 1.0,
        dashed: true,
    });
    for handle in ResizeHandle::ALL {
        cmds.push(DrawCmd::HandleSquare {
            center: vp.norm_to_screen(handle.position(bounds)),
            size: HANDLE_SIZE,
        });
    }
}

/// Build the overlay for an in-progress gesture.
pub fn preview_display_list(
    gesture: &ToolGesture,
    tool: ToolKind,
    style: ToolStyle,
    vp: &Viewport,
) -> Vec<DrawCmd> {
    let mut probe = gesture.clone();
    match probe.end(tool, style) {
        GestureOutcome::Annotation(ann) => {
            let mut cmds = Vec::new();
            annotation_cmds(&ann, vp, &mut cmds);
            cmds
        }
        GestureOutcome::Redaction(red) => {
            let rect = Rect::new(red.x, red.y, red.x + red.width, red.y + red.height);
            vec![DrawCmd::FillRect {
                rect: to_screen_rect(rect, vp),
                color: Color::black(),
                opacity: 0.5,
            }]
        }
        GestureOutcome::FormFieldRequest {
            x,
            y,
            width,
            height,
            ..
        } => {
            vec![DrawCmd::StrokeRect {
                rect: to_screen_rect(Rect::new(x, y, x + width, y + height), vp),
                color: Color::new(0, 120, 255, 255),
                width: 1.0,
                opacity: 1.0,
                dashed: true,
            }]
        }
        GestureOutcome::TextInsert { .. } | GestureOutcome::Nothing => Vec::new(),
    }
}

fn to_screen_rect(norm: Rect, vp: &Viewport) -> Rect {
    let tl = vp.norm_to_screen(Point::new(norm.x0, norm.y0));
    let br = vp.norm_to_screen(Point::new(norm.x1, norm.y1));
    Rect::new(tl.x, tl.y, br.x, br.y)
}

/// The rects a text-markup annotation covers: its quads when present,
/// otherwise the whole bounding box.
fn markup_quads(ann: &Annotation) -> Vec<Rect> {
    match &ann.text_quads {
        Some(quads) if !quads.is_empty() => quads.clone(),
        _ => vec![ann.bounds()],
    }
}

/// Triangle at the arrow tip, pointing along the shaft.
fn arrow_head(from: Point, to: Point) -> Vec<Point> {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let len = (dx * dx + dy * dy).sqrt();
    if len < 1e-6 {
        return vec![to, to, to];
    }
    let (ux, uy) = (dx / len, dy / len);
    let size = 10.0_f64.min(len / 2.0);
    let base = Point::new(to.x - ux * size, to.y - uy * size);
    // Perpendicular
    let (px, py) = (-uy, ux);
    vec![
        to,
        Point::new(base.x + px * size / 2.0, base.y + py * size / 2.0),
        Point::new(base.x - px * size / 2.0, base.y - py * size / 2.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagemark_core::model::Annotation;

    fn vp() -> Viewport {
        Viewport::new(Point::new(0.0, 0.0), 1000.0, 1000.0)
    }

    fn list(ann: Annotation) -> Vec<DrawCmd> {
        page_display_list(&[ann], &[], None, 1, &vp())
    }

    #[test]
    fn test_highlight_renders_translucent_fill() {
        let mut ann = Annotation::new(AnnotationKind::Highlight, 1, 0.1, 0.1).with_size(0.3, 0.1);
        ann.opacity = 0.3;
        let cmds = list(ann);
        assert_eq!(cmds.len(), 1);
        let DrawCmd::FillRect { rect, opacity, .. } = &cmds[0] else {
            panic!("expected fill");
        };
        assert_eq!(*opacity, 0.3);
        assert_eq!(rect.x0, 100.0);
        assert_eq!(rect.x1, 400.0);
    }

    #[test]
    fn test_underline_stroke_sits_at_quad_bottom() {
        let mut ann = Annotation::new(AnnotationKind::Underline, 1, 0.1, 0.1).with_size(0.3, 0.05);
        ann.text_quads = Some(vec![Rect::new(0.1, 0.1, 0.4, 0.15)]);
        let cmds = list(ann);
        let DrawCmd::Line { from, to, .. } = &cmds[0] else {
            panic!("expected line");
        };
        assert_eq!(from.y, 150.0);
        assert_eq!(to.y, 150.0);
        assert_eq!(from.x, 100.0);
        assert_eq!(to.x, 400.0);
    }

    #[test]
    fn test_strikethrough_crosses_quad_middle() {
        let mut ann =
            Annotation::new(AnnotationKind::Strikethrough, 1, 0.1, 0.1).with_size(0.3, 0.1);
        ann.text_quads = Some(vec![Rect::new(0.1, 0.1, 0.4, 0.2)]);
        let cmds = list(ann);
        let DrawCmd::Line { from, .. } = &cmds[0] else {
            panic!("expected line");
        };
        assert_eq!(from.y, 150.0);
    }

    #[test]
    fn test_arrow_gets_head() {
        let ann = Annotation::new(AnnotationKind::Arrow, 1, 0.1, 0.1).with_size(0.2, 0.2);
        let cmds = list(ann);
        assert_eq!(cmds.len(), 2);
        assert!(matches!(cmds[0], DrawCmd::Line { .. }));
        let DrawCmd::FillPolygon { points, .. } = &cmds[1] else {
            panic!("expected polygon");
        };
        assert_eq!(points.len(), 3);
        assert!((points[0].x - 300.0).abs() < 1e-9);
        assert!((points[0].y - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_freehand_polyline_follows_path() {
        let mut ann = Annotation::new(AnnotationKind::Freehand, 1, 0.1, 0.1).with_size(0.2, 0.1);
        ann.path = Some(vec![
            Point::new(0.1, 0.1),
            Point::new(0.2, 0.15),
            Point::new(0.3, 0.1),
        ]);
        let cmds = list(ann);
        let DrawCmd::Polyline { points, .. } = &cmds[0] else {
            panic!("expected polyline");
        };
        assert_eq!(points.len(), 3);
        assert_eq!(points[1], Point::new(200.0, 150.0));
    }

    #[test]
    fn test_redactions_render_opaque_black() {
        let red = RedactionArea::new(1, 0.2, 0.2, 0.1, 0.1);
        let cmds = page_display_list(&[], &[red], None, 1, &vp());
        let DrawCmd::FillRect { color, opacity, .. } = &cmds[0] else {
            panic!("expected fill");
        };
        assert_eq!(*color, Color::black());
        assert_eq!(*opacity, 1.0);
    }

    #[test]
    fn test_selection_adds_dashed_box_and_eight_handles() {
        let ann = Annotation::new(AnnotationKind::Rectangle, 1, 0.1, 0.1).with_size(0.2, 0.2);
        let id = ann.id;
        let cmds = page_display_list(&[ann], &[], Some(id), 1, &vp());
        let dashed = cmds
            .iter()
            .filter(|c| matches!(c, DrawCmd::StrokeRect { dashed: true, .. }))
            .count();
        let handles = cmds
            .iter()
            .filter(|c| matches!(c, DrawCmd::HandleSquare { .. }))
            .count();
        assert_eq!(dashed, 1);
        assert_eq!(handles, 8);
    }

    #[test]
    fn test_other_pages_not_rendered() {
        let ann = Annotation::new(AnnotationKind::Rectangle, 2, 0.1, 0.1).with_size(0.2, 0.2);
        assert!(page_display_list(&[ann], &[], None, 1, &vp()).is_empty());
    }

    #[test]
    fn test_preview_mirrors_gesture() {
        let mut gesture = ToolGesture::default();
        gesture.begin(1, Point::new(0.1, 0.1));
        gesture.update(Point::new(0.3, 0.3));
        let cmds = preview_display_list(&gesture, ToolKind::Rectangle, ToolStyle::default(), &vp());
        assert!(matches!(cmds[0], DrawCmd::StrokeRect { .. }));
        // Probing the preview must not consume the live gesture.
        assert!(gesture.is_active());
    }

    #[test]
    fn test_preview_empty_when_idle() {
        let gesture = ToolGesture::default();
        let cmds = preview_display_list(&gesture, ToolKind::Rectangle, ToolStyle::default(), &vp());
        assert!(cmds.is_empty());
    }

    #[test]
    fn test_image_without_payload_renders_placeholder() {
        let ann = Annotation::new(AnnotationKind::Stamp, 1, 0.1, 0.1).with_size(0.2, 0.2);
        let cmds = list(ann);
        assert!(matches!(cmds[0], DrawCmd::StrokeRect { dashed: true, .. }));
    }
}
