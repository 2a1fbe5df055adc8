//! Detection records produced per inference pass.

mod classes;

pub use classes::{class_name, SealClass, CLASS_NAMES, NUM_CLASSES, UNKNOWN_LABEL};

use crate::geometry::BBox;

/// One candidate object found by the model in one frame.
///
/// Detections are plain values: they are rebuilt every frame and compared by
/// value, never by identity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Detection {
    /// Corner-form box in normalized model-input space.
    pub bbox: BBox,
    /// Raw center-form width, used for size measurements.
    pub width: f32,
    /// Raw center-form height, used for size measurements.
    pub height: f32,
    /// Index into [`CLASS_NAMES`].
    pub class_id: usize,
    /// Class name resolved from `class_id`.
    pub label: &'static str,
    /// Objectness times the winning class score.
    pub confidence: f32,
}

impl Detection {
    /// Builds a detection from a center-form box, resolving the label.
    pub fn from_center(
        cx: f32,
        cy: f32,
        width: f32,
        height: f32,
        class_id: usize,
        confidence: f32,
    ) -> Self {
        Self {
            bbox: BBox::from_center(cx, cy, width, height),
            width,
            height,
            class_id,
            label: class_name(class_id),
            confidence,
        }
    }

    /// Class of this detection, if the id is in range.
    pub fn class(&self) -> Option<SealClass> {
        SealClass::from_id(self.class_id)
    }

    /// Mean of width and height in model-input units (`size * input_size`).
    pub fn diameter_px(&self, input_size: f32) -> f32 {
        (self.width + self.height) / 2.0 * input_size
    }
}

/// Picks the detection under a normalized point.
///
/// When boxes overlap the most confident one wins; equal confidences resolve
/// to the earliest in `detections`.
pub fn hit_test(detections: &[Detection], x: f32, y: f32) -> Option<&Detection> {
    let mut best: Option<&Detection> = None;
    for det in detections.iter().filter(|d| d.bbox.contains(x, y)) {
        match best {
            Some(current) if det.confidence <= current.confidence => {}
            _ => best = Some(det),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::{hit_test, Detection, SealClass};

    #[test]
    fn from_center_resolves_label() {
        let det = Detection::from_center(0.5, 0.5, 0.2, 0.2, 2, 0.81);
        assert_eq!(det.label, "OK");
        assert_eq!(det.class(), Some(SealClass::Ok));
        assert!((det.diameter_px(640.0) - 128.0).abs() < 1e-4);

        let unknown = Detection::from_center(0.5, 0.5, 0.2, 0.2, 9, 0.9);
        assert_eq!(unknown.label, "unknown");
        assert!(unknown.class().is_none());
    }

    #[test]
    fn hit_test_prefers_confident_overlap() {
        let dets = [
            Detection::from_center(0.5, 0.5, 0.4, 0.4, 0, 0.6),
            Detection::from_center(0.5, 0.5, 0.2, 0.2, 2, 0.9),
            Detection::from_center(0.9, 0.9, 0.1, 0.1, 2, 0.95),
        ];
        let hit = hit_test(&dets, 0.5, 0.5).unwrap();
        assert_eq!(hit.class_id, 2);
        assert_eq!(hit.confidence, 0.9);

        let outer = hit_test(&dets, 0.35, 0.35).unwrap();
        assert_eq!(outer.class_id, 0);

        assert!(hit_test(&dets, 0.05, 0.05).is_none());
    }

    #[test]
    fn hit_test_ties_keep_first() {
        let dets = [
            Detection::from_center(0.5, 0.5, 0.2, 0.2, 1, 0.7),
            Detection::from_center(0.5, 0.5, 0.2, 0.2, 3, 0.7),
        ];
        assert_eq!(hit_test(&dets, 0.5, 0.5).unwrap().class_id, 1);
    }
}
