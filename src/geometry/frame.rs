//! Mapping between normalized model space and displayed frame pixels.

use super::BBox;

/// Linear scale from the normalized unit square to a frame of
/// `width x height` pixels.
///
/// Rendering maps boxes out with [`FrameScale::to_frame`]; click hit-testing
/// maps a pointer position back in with [`FrameScale::to_normalized`], so both
/// sides agree on where a detection sits.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameScale {
    pub width: f32,
    pub height: f32,
}

impl FrameScale {
    /// Creates a scale for a frame of the given pixel size.
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Maps a normalized box to frame pixels.
    pub fn to_frame(&self, bbox: &BBox) -> BBox {
        BBox {
            x1: bbox.x1 * self.width,
            y1: bbox.y1 * self.height,
            x2: bbox.x2 * self.width,
            y2: bbox.y2 * self.height,
        }
    }

    /// Maps a frame-pixel point to normalized model space.
    ///
    /// Returns `None` for an empty or non-finite frame size.
    pub fn to_normalized(&self, x: f32, y: f32) -> Option<(f32, f32)> {
        let valid = |v: f32| v.is_finite() && v > 0.0;
        if !valid(self.width) || !valid(self.height) {
            return None;
        }
        Some((x / self.width, y / self.height))
    }
}

#[cfg(test)]
mod tests {
    use super::FrameScale;
    use crate::geometry::BBox;

    #[test]
    fn frame_round_trip_point() {
        let scale = FrameScale::new(1280.0, 720.0);
        let b = scale.to_frame(&BBox::new(0.25, 0.5, 0.75, 1.0));
        assert_eq!(b, BBox::new(320.0, 360.0, 960.0, 720.0));

        let (nx, ny) = scale.to_normalized(640.0, 540.0).unwrap();
        assert!((nx - 0.5).abs() < 1e-6);
        assert!((ny - 0.75).abs() < 1e-6);
    }

    #[test]
    fn empty_frame_rejects_points() {
        assert!(FrameScale::new(0.0, 480.0).to_normalized(1.0, 1.0).is_none());
        assert!(FrameScale::new(640.0, f32::NAN)
            .to_normalized(1.0, 1.0)
            .is_none());
    }
}
