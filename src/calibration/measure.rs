//! Physical-size annotations for rendering.

use super::Calibration;
use crate::detection::{Detection, SealClass};

/// A detection paired with its physical diameter, when one applies.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Measurement {
    pub detection: Detection,
    /// Diameter in millimeters; only `OK` seals are measured.
    pub diameter_mm: Option<f32>,
}

/// Annotates each detection, measuring `OK` seals when calibrated.
pub fn measure(detections: &[Detection], calibration: &Calibration) -> Vec<Measurement> {
    detections
        .iter()
        .map(|det| Measurement {
            detection: *det,
            diameter_mm: match det.class() {
                Some(SealClass::Ok) => calibration.physical_size(det),
                _ => None,
            },
        })
        .collect()
}
