//! Intersection-over-union for corner-form boxes.

use super::BBox;

/// Standard IoU between two corner-form boxes.
///
/// Intersection extents are clamped at zero, so disjoint or inverted boxes
/// contribute no overlap. A union that is not strictly positive (degenerate
/// zero-area boxes, or NaN input) yields `0.0`.
pub fn intersection_over_union(a: &BBox, b: &BBox) -> f32 {
    let ix1 = a.x1.max(b.x1);
    let iy1 = a.y1.max(b.y1);
    let ix2 = a.x2.min(b.x2);
    let iy2 = a.y2.min(b.y2);

    let inter = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
    let union = a.area() + b.area() - inter;
    if union > 0.0 {
        inter / union
    } else {
        0.0
    }
}
