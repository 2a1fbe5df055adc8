//! Class-wise greedy non-maximum suppression.

use crate::detection::Detection;
use crate::geometry::intersection_over_union;
use crate::trace::{trace_event, trace_span};
use crate::util::{RingGaugeError, RingGaugeResult};
use std::cmp::Ordering;

/// Default IoU above which a same-class detection is suppressed.
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.5;

/// Suppression configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NmsConfig {
    /// Same-class pairs with IoU strictly above this are collapsed.
    pub iou_threshold: f32,
}

impl Default for NmsConfig {
    fn default() -> Self {
        Self {
            iou_threshold: DEFAULT_IOU_THRESHOLD,
        }
    }
}

impl NmsConfig {
    /// Checks that the threshold is a finite number.
    pub fn validate(&self) -> RingGaugeResult<()> {
        if !self.iou_threshold.is_finite() {
            return Err(RingGaugeError::InvalidConfig(
                "iou_threshold must be finite",
            ));
        }
        Ok(())
    }
}

fn confidence_desc(a: &Detection, b: &Detection) -> Ordering {
    b.confidence.total_cmp(&a.confidence)
}

/// Sorts detections by descending confidence, keeping input order on ties.
pub fn sort_by_confidence(detections: &mut [Detection]) {
    detections.sort_by(confidence_desc);
}

/// Greedy per-class NMS.
///
/// Detections are visited in descending confidence (stable, so equal scores
/// keep their input order). A detection is kept unless an already kept
/// detection of the same class overlaps it with IoU above the threshold.
/// Detections of different classes never suppress each other. The result is
/// a new vector in descending confidence order; the input is untouched.
///
/// `cfg` must pass [`NmsConfig::validate`]; a NaN threshold would keep every
/// box. [`crate::Detector`] validates before calling this.
pub fn suppress(detections: &[Detection], cfg: &NmsConfig) -> Vec<Detection> {
    debug_assert!(
        cfg.iou_threshold.is_finite(),
        "iou_threshold must be finite, got {}",
        cfg.iou_threshold
    );
    let _span = trace_span!("suppress", input = detections.len()).entered();

    let mut ordered = detections.to_vec();
    sort_by_confidence(&mut ordered);

    let mut kept: Vec<Detection> = Vec::with_capacity(ordered.len());
    'outer: for det in ordered {
        for kept_det in kept.iter().filter(|k| k.class_id == det.class_id) {
            if intersection_over_union(&det.bbox, &kept_det.bbox) > cfg.iou_threshold {
                continue 'outer;
            }
        }
        kept.push(det);
    }

    trace_event!("suppressed", input = detections.len(), kept = kept.len());
    kept
}

#[cfg(test)]
mod tests {
    use super::{suppress, NmsConfig};
    use crate::detection::Detection;

    fn det(cx: f32, cy: f32, size: f32, class_id: usize, confidence: f32) -> Detection {
        Detection::from_center(cx, cy, size, size, class_id, confidence)
    }

    #[test]
    fn keeps_best_of_overlapping_cluster() {
        let input = [
            det(0.50, 0.50, 0.2, 2, 0.6),
            det(0.51, 0.50, 0.2, 2, 0.9),
            det(0.50, 0.51, 0.2, 2, 0.7),
        ];
        let out = suppress(&input, &NmsConfig::default());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].confidence, 0.9);
    }

    #[test]
    fn different_classes_do_not_suppress() {
        let input = [det(0.5, 0.5, 0.2, 2, 0.9), det(0.5, 0.5, 0.2, 4, 0.8)];
        let out = suppress(&input, &NmsConfig::default());
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].class_id, 2);
        assert_eq!(out[1].class_id, 4);
    }

    #[test]
    fn iou_at_threshold_is_kept() {
        // Same height, x-offset chosen so IoU is exactly 0.5: inter = 2/3 of each box.
        let a = Detection::from_center(0.0, 0.0, 3.0, 1.0, 0, 0.9);
        let b = Detection::from_center(1.0, 0.0, 3.0, 1.0, 0, 0.8);
        let out = suppress(&[a, b], &NmsConfig::default());
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn equal_confidence_keeps_input_order() {
        let first = det(0.5, 0.5, 0.2, 1, 0.7);
        let second = det(0.505, 0.5, 0.2, 1, 0.7);
        let out = suppress(&[first, second], &NmsConfig::default());
        assert_eq!(out, vec![first]);

        let out = suppress(&[second, first], &NmsConfig::default());
        assert_eq!(out, vec![second]);
    }

    #[test]
    fn output_is_sorted_descending() {
        let input = [
            det(0.1, 0.1, 0.05, 0, 0.5),
            det(0.5, 0.5, 0.05, 0, 0.95),
            det(0.9, 0.9, 0.05, 0, 0.7),
        ];
        let out = suppress(&input, &NmsConfig::default());
        let scores: Vec<f32> = out.iter().map(|d| d.confidence).collect();
        assert_eq!(scores, vec![0.95, 0.7, 0.5]);
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert!(suppress(&[], &NmsConfig::default()).is_empty());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "iou_threshold must be finite")]
    fn nan_threshold_trips_debug_check() {
        let cfg = NmsConfig {
            iou_threshold: f32::NAN,
        };
        suppress(&[det(0.5, 0.5, 0.2, 0, 0.9)], &cfg);
    }

    #[test]
    fn nan_threshold_fails_validation() {
        let cfg = NmsConfig {
            iou_threshold: f32::NAN,
        };
        assert!(cfg.validate().is_err());
        assert!(NmsConfig::default().validate().is_ok());
    }
}
