//! Screen/page coordinate transforms.
//!
//! Annotations live in normalized page coordinates (0-1 fractions of the
//! page). The viewport maps them to screen pixels given the rendered page
//! origin, its base pixel size and the zoom factor.

use kurbo::Point;

pub const MIN_ZOOM: f64 = 0.25;
pub const MAX_ZOOM: f64 = 4.0;
pub const ZOOM_STEP: f64 = 1.2;

#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    /// Top-left corner of the rendered page, in screen pixels.
    pub origin: Point,
    /// Page size at zoom 1.0, in screen pixels.
    pub page_width: f64,
    pub page_height: f64,
    pub zoom: f64,
}

impl Viewport {
    pub fn new(origin: Point, page_width: f64, page_height: f64) -> Self {
        Self {
            origin,
            page_width,
            page_height,
            zoom: 1.0,
        }
    }

    /// Rendered page width in screen pixels at the current zoom.
    pub fn scaled_width(&self) -> f64 {
        self.page_width * self.zoom
    }

    pub fn scaled_height(&self) -> f64 {
        self.page_height * self.zoom
    }

    /// Convert a screen position to normalized page coordinates.
    /// The result is clamped into [0, 1] on both axes, so pointer positions
    /// outside the page edge pin to the edge.
    pub fn screen_to_norm(&self, screen: Point) -> Point {
        let x = (screen.x - self.origin.x) / self.scaled_width();
        let y = (screen.y - self.origin.y) / self.scaled_height();
        Point::new(x.clamp(0.0, 1.0), y.clamp(0.0, 1.0))
    }

    /// Convert normalized page coordinates to a screen position.
    pub fn norm_to_screen(&self, norm: Point) -> Point {
        Point::new(
            self.origin.x + norm.x * self.scaled_width(),
            self.origin.y + norm.y * self.scaled_height(),
        )
    }

    /// Scale a normalized length to screen pixels along the x axis.
    pub fn scale_x(&self, norm: f64) -> f64 {
        norm * self.scaled_width()
    }

    /// Scale a normalized length to screen pixels along the y axis.
    pub fn scale_y(&self, norm: f64) -> f64 {
        norm * self.scaled_height()
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom * ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom / ZOOM_STEP);
    }

    pub fn zoom_reset(&mut self) {
        self.zoom = 1.0;
    }
}
