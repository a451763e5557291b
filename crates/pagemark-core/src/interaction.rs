//! Selection interaction: hit testing, dragging and handle resize.
//!
//! All of this operates on normalized page coordinates and is pure, so the
//! behavior is testable without any rendering surface.

use crate::model::{Annotation, AnnotationId};
use kurbo::{Point, Rect};

/// Minimum width/height a resize can shrink an annotation to.
pub const MIN_RESIZE_DIMENSION: f64 = 0.02;

/// Find the topmost annotation on a page under a point.
///
/// Later insertions render on top, so the scan runs in reverse insertion
/// order and stops at the first bounding-box hit.
pub fn hit_test<'a>(
    annotations: impl DoubleEndedIterator<Item = &'a Annotation>,
    point: Point,
) -> Option<&'a Annotation> {
    annotations.rev().find(|a| a.hit_test(point))
}

/// An in-progress move of a selected annotation.
#[derive(Debug, Clone, Copy)]
pub struct DragState {
    pub id: AnnotationId,
    /// Pointer offset from the annotation's top-left corner at grab time,
    /// so the shape does not jump under the cursor.
    pub grab_offset: Point,
}

impl DragState {
    pub fn begin(annotation: &Annotation, pointer: Point) -> Self {
        Self {
            id: annotation.id,
            grab_offset: Point::new(pointer.x - annotation.x, pointer.y - annotation.y),
        }
    }

    /// New top-left position for the dragged annotation, clamped so the
    /// whole bounding box stays inside the page.
    pub fn position(&self, annotation: &Annotation, pointer: Point) -> Point {
        let w = annotation.extent_width();
        let h = annotation.extent_height();
        let x = (pointer.x - self.grab_offset.x).clamp(0.0, (1.0 - w).max(0.0));
        let y = (pointer.y - self.grab_offset.y).clamp(0.0, (1.0 - h).max(0.0));
        Point::new(x, y)
    }
}

/// The eight compass resize handles around a selection box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeHandle {
    NorthWest,
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::NorthWest,
        ResizeHandle::North,
        ResizeHandle::NorthEast,
        ResizeHandle::East,
        ResizeHandle::SouthEast,
        ResizeHandle::South,
        ResizeHandle::SouthWest,
        ResizeHandle::West,
    ];

    /// Position of this handle on a bounding box.
    pub fn position(&self, rect: Rect) -> Point {
        let cx = (rect.x0 + rect.x1) / 2.0;
        let cy = (rect.y0 + rect.y1) / 2.0;
        match self {
            ResizeHandle::NorthWest => Point::new(rect.x0, rect.y0),
            ResizeHandle::North => Point::new(cx, rect.y0),
            ResizeHandle::NorthEast => Point::new(rect.x1, rect.y0),
            ResizeHandle::East => Point::new(rect.x1, cy),
            ResizeHandle::SouthEast => Point::new(rect.x1, rect.y1),
            ResizeHandle::South => Point::new(cx, rect.y1),
            ResizeHandle::SouthWest => Point::new(rect.x0, rect.y1),
            ResizeHandle::West => Point::new(rect.x0, cy),
        }
    }

    fn moves_left(&self) -> bool {
        matches!(
            self,
            ResizeHandle::NorthWest | ResizeHandle::SouthWest | ResizeHandle::West
        )
    }

    fn moves_right(&self) -> bool {
        matches!(
            self,
            ResizeHandle::NorthEast | ResizeHandle::SouthEast | ResizeHandle::East
        )
    }

    fn moves_top(&self) -> bool {
        matches!(
            self,
            ResizeHandle::NorthWest | ResizeHandle::North | ResizeHandle::NorthEast
        )
    }

    fn moves_bottom(&self) -> bool {
        matches!(
            self,
            ResizeHandle::SouthWest | ResizeHandle::South | ResizeHandle::SouthEast
        )
    }
}

/// Compute the resized box from the pre-drag rect and the pointer delta.
///
/// Only the edges the handle controls move; the box never shrinks below
/// the minimum dimension and is kept inside [0, 1]².
pub fn apply_resize(original: Rect, handle: ResizeHandle, delta: Point) -> Rect {
    let mut x0 = original.x0;
    let mut y0 = original.y0;
    let mut x1 = original.x1;
    let mut y1 = original.y1;

    // Bounds are kept inside [0, 1] themselves: a box already narrower
    // than the minimum (gestures impose none) or flush against a page
    // edge must not invert the clamp range.
    if handle.moves_left() {
        x0 = (x0 + delta.x).clamp(0.0, (x1 - MIN_RESIZE_DIMENSION).max(0.0));
    }
    if handle.moves_right() {
        x1 = (x1 + delta.x).clamp((x0 + MIN_RESIZE_DIMENSION).min(1.0), 1.0);
    }
    if handle.moves_top() {
        y0 = (y0 + delta.y).clamp(0.0, (y1 - MIN_RESIZE_DIMENSION).max(0.0));
    }
    if handle.moves_bottom() {
        y1 = (y1 + delta.y).clamp((y0 + MIN_RESIZE_DIMENSION).min(1.0), 1.0);
    }

    Rect::new(x0, y0, x1, y1)
}
