//! The fixed logical design surface certificates are laid out on.
//!
//! Stored coordinates always live in this space. Screens and PDF pages apply a
//! uniform scale when drawing; they never write scaled values back.

use serde::{Deserialize, Serialize};

/// Width of the design surface in logical units.
pub const LOGICAL_WIDTH: f64 = 720.0;
/// Height of the design surface in logical units (A4 landscape ratio).
pub const LOGICAL_HEIGHT: f64 = 508.5;

/// A coordinate pair in logical canvas units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Whether the point falls on the visible surface. Positions outside it are
    /// legal, they are simply drawn off-canvas.
    pub fn is_on_canvas(&self) -> bool {
        (0.0..=LOGICAL_WIDTH).contains(&self.x) && (0.0..=LOGICAL_HEIGHT).contains(&self.y)
    }
}

/// Uniform logical-to-screen scale factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasScale(f64);

impl CanvasScale {
    pub const IDENTITY: CanvasScale = CanvasScale(1.0);

    /// Largest uniform scale at which the whole surface fits the given box.
    /// Degenerate boxes fall back to the identity scale. An infinite side
    /// leaves the other one to decide.
    pub fn fit(available_width: f64, available_height: f64) -> Self {
        if available_width.is_nan() || available_height.is_nan() {
            return CanvasScale::IDENTITY;
        }
        let by_width = available_width / LOGICAL_WIDTH;
        let by_height = available_height / LOGICAL_HEIGHT;
        let factor = by_width.min(by_height);
        if factor.is_finite() && factor > 0.0 {
            CanvasScale(factor)
        } else {
            CanvasScale::IDENTITY
        }
    }

    /// Scale that fills the given width, height following the aspect ratio.
    pub fn fit_width(available_width: f64) -> Self {
        Self::fit(available_width, f64::INFINITY)
    }

    pub fn factor(&self) -> f64 {
        self.0
    }

    pub fn to_screen(&self, point: Point) -> Point {
        Point::new(point.x * self.0, point.y * self.0)
    }

    pub fn to_logical(&self, point: Point) -> Point {
        Point::new(point.x / self.0, point.y / self.0)
    }

    /// Screen size of the whole surface.
    pub fn screen_size(&self) -> (f64, f64) {
        (LOGICAL_WIDTH * self.0, LOGICAL_HEIGHT * self.0)
    }
}
