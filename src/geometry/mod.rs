//! Axis-aligned boxes in normalized model-input space.
//!
//! Coordinates are fractions of the square model input: `0.0..=1.0` spans the
//! full 640-unit side. Nothing here enforces `x2 >= x1` or `y2 >= y1`;
//! inverted boxes are carried as-is and simply never overlap anything.

mod frame;
mod iou;

pub use frame::FrameScale;
pub use iou::intersection_over_union;

/// Corner-form rectangle (`x1,y1` top-left, `x2,y2` bottom-right).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BBox {
    /// Creates a box from its corners.
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Converts a center-form `(cx, cy, w, h)` box to corner form.
    pub fn from_center(cx: f32, cy: f32, w: f32, h: f32) -> Self {
        let half_w = w / 2.0;
        let half_h = h / 2.0;
        Self {
            x1: cx - half_w,
            y1: cy - half_h,
            x2: cx + half_w,
            y2: cy + half_h,
        }
    }

    /// Horizontal extent; negative for inverted boxes.
    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    /// Vertical extent; negative for inverted boxes.
    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    /// Signed area, `width * height`.
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Box center.
    pub fn center(&self) -> (f32, f32) {
        ((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    /// Returns true when `(x, y)` lies inside the box, edges included.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x1 && x <= self.x2 && y >= self.y1 && y <= self.y2
    }
}
