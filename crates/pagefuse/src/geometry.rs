//! Rectangle geometry in image-pixel coordinates.
//!
//! Every prediction, word, and cell in this crate carries a [`Rect`]. All
//! arithmetic is `f32`, matching the precision of the upstream detector
//! responses.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in image-pixel space.
///
/// `x0 <= x1` and `y0 <= y1` are not enforced by the type itself (detector
/// responses occasionally arrive inverted); [`Rect::area`] clamps negative
/// extents to zero rather than panicking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    pub const fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f32 {
        (self.x1 - self.x0).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.y1 - self.y0).max(0.0)
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    pub fn center_x(&self) -> f32 {
        (self.x0 + self.x1) / 2.0
    }

    pub fn center_y(&self) -> f32 {
        (self.y0 + self.y1) / 2.0
    }

    /// Translate by `(dx, dy)`, e.g. crop-local -> page coordinates.
    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.x0 + dx, self.y0 + dy, self.x1 + dx, self.y1 + dy)
    }

    /// Area of the intersection of two rectangles, zero if they don't overlap.
    pub fn overlap_area(&self, other: &Rect) -> f32 {
        let x_overlap = (self.x1.min(other.x1) - self.x0.max(other.x0)).max(0.0);
        let y_overlap = (self.y1.min(other.y1) - self.y0.max(other.y0)).max(0.0);
        x_overlap * y_overlap
    }

    /// Fraction of `self`'s area that lies inside `other`.
    ///
    /// Zero when `self` is degenerate (`area == 0`), never `NaN`.
    pub fn containment(&self, other: &Rect) -> f32 {
        let area = self.area();
        if area <= 0.0 { 0.0 } else { self.overlap_area(other) / area }
    }

    /// Tight bounding box of a set of rectangles.
    ///
    /// Returns `None` for an empty slice.
    pub fn union_of<'a>(rects: impl IntoIterator<Item = &'a Rect>) -> Option<Rect> {
        rects.into_iter().fold(None, |acc, r| match acc {
            None => Some(*r),
            Some(u) => Some(Rect::new(
                u.x0.min(r.x0),
                u.y0.min(r.y0),
                u.x1.max(r.x1),
                u.y1.max(r.y1),
            )),
        })
    }

    /// Top-left reading-order score used by the table row sweep: `y + m*x`.
    pub fn top_left_score(&self, m: f32) -> f32 {
        self.y0 + m * self.x0
    }
}
