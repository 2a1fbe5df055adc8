//! Pixel-to-millimeter calibration workflow.
//!
//! The user enters the physical diameter of a reference object, starts
//! calibration, clicks the detection that corresponds to it, and completes.
//! Completion derives a single `pixels_per_mm` factor from the reference's
//! mean side length in model-input pixels; every later measurement divides by
//! that factor. There is no perspective correction, so reference and measured
//! objects are assumed roughly coplanar.
//!
//! ```text
//! Uncalibrated --start--> AwaitingReference --complete--> Calibrated
//!      ^                        |                             |
//!      +---------reset----------+------------reset------------+
//! ```
//!
//! Rejected calls return a [`CalibrationError`] and leave the state untouched.

mod measure;

pub use measure::{measure, Measurement};

use crate::detection::Detection;
use crate::trace::trace_debug;
use crate::util::{CalibrationError, RingGaugeError, RingGaugeResult};

/// Side length of the square model input, in pixels.
pub const MODEL_INPUT_SIZE: f32 = 640.0;

/// Coarse workflow mode, as shown to the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CalibrationMode {
    Uncalibrated,
    AwaitingReference,
    Calibrated,
}

impl CalibrationMode {
    /// Lower-case name used in messages.
    pub fn as_str(self) -> &'static str {
        match self {
            CalibrationMode::Uncalibrated => "uncalibrated",
            CalibrationMode::AwaitingReference => "awaiting reference selection",
            CalibrationMode::Calibrated => "calibrated",
        }
    }
}

// Per-mode data lives inside the variant so a factor cannot exist outside
// `Calibrated` and a selection cannot exist outside `AwaitingReference`.
#[derive(Clone, Debug, PartialEq)]
enum State {
    Uncalibrated,
    AwaitingReference { selected: Option<Detection> },
    Calibrated { pixels_per_mm: f32 },
}

/// Calibration state machine.
///
/// Owned by whoever drives the UI and passed by reference to measurement
/// code; there is no global instance.
#[derive(Clone, Debug, PartialEq)]
pub struct Calibration {
    input_size: f32,
    reference_size_mm: Option<f32>,
    state: State,
}

impl Default for Calibration {
    fn default() -> Self {
        Self::new()
    }
}

impl Calibration {
    /// Creates an uncalibrated state for the 640-pixel model input.
    pub fn new() -> Self {
        Self {
            input_size: MODEL_INPUT_SIZE,
            reference_size_mm: None,
            state: State::Uncalibrated,
        }
    }

    /// Overrides the model input side length used to scale normalized sizes.
    ///
    /// The size must be positive and finite.
    pub fn with_input_size(mut self, input_size: f32) -> RingGaugeResult<Self> {
        if !(input_size.is_finite() && input_size > 0.0) {
            return Err(RingGaugeError::InvalidConfig(
                "input_size must be positive and finite",
            ));
        }
        self.input_size = input_size;
        Ok(self)
    }

    /// Rebuilds a calibrated state from persisted values.
    pub fn restore(reference_size_mm: f32, pixels_per_mm: f32) -> Result<Self, CalibrationError> {
        validate_size(reference_size_mm)?;
        if !(pixels_per_mm.is_finite() && pixels_per_mm > 0.0) {
            return Err(CalibrationError::InvalidScale {
                value: pixels_per_mm,
            });
        }
        Ok(Self {
            input_size: MODEL_INPUT_SIZE,
            reference_size_mm: Some(reference_size_mm),
            state: State::Calibrated { pixels_per_mm },
        })
    }

    /// Current workflow mode.
    pub fn mode(&self) -> CalibrationMode {
        match self.state {
            State::Uncalibrated => CalibrationMode::Uncalibrated,
            State::AwaitingReference { .. } => CalibrationMode::AwaitingReference,
            State::Calibrated { .. } => CalibrationMode::Calibrated,
        }
    }

    /// Model input side length in pixels.
    pub fn input_size(&self) -> f32 {
        self.input_size
    }

    /// Last accepted reference size in millimeters.
    pub fn reference_size_mm(&self) -> Option<f32> {
        self.reference_size_mm
    }

    /// Scale factor, present only when calibrated.
    pub fn pixels_per_mm(&self) -> Option<f32> {
        match self.state {
            State::Calibrated { pixels_per_mm } => Some(pixels_per_mm),
            _ => None,
        }
    }

    /// Snapshot of the detection chosen as reference, while awaiting completion.
    pub fn selected_reference(&self) -> Option<&Detection> {
        match &self.state {
            State::AwaitingReference { selected } => selected.as_ref(),
            _ => None,
        }
    }

    /// Returns true when `detection` equals the selected snapshot by value.
    pub fn is_reference(&self, detection: &Detection) -> bool {
        self.selected_reference() == Some(detection)
    }

    /// Records the physical diameter of the reference object.
    ///
    /// Allowed in every mode. An existing factor is kept; the new size only
    /// takes effect at the next completion. Invalid sizes leave the previous
    /// value intact.
    pub fn set_reference_size(&mut self, mm: f32) -> Result<(), CalibrationError> {
        validate_size(mm)?;
        self.reference_size_mm = Some(mm);
        trace_debug!("reference_size_set", mm = mm);
        Ok(())
    }

    /// Enters reference selection.
    ///
    /// Needs a reference size. Starting from `Calibrated` recalibrates and
    /// drops the current factor; starting while already awaiting is rejected.
    pub fn start_calibration(&mut self) -> Result<(), CalibrationError> {
        if self.reference_size_mm.is_none() {
            return Err(CalibrationError::MissingReferenceSize);
        }
        if let State::AwaitingReference { .. } = self.state {
            return Err(self.invalid_state("start calibration"));
        }
        self.state = State::AwaitingReference { selected: None };
        trace_debug!("calibration_started");
        Ok(())
    }

    /// Takes a snapshot of `detection` as the reference candidate.
    ///
    /// A later call replaces the earlier selection.
    pub fn select_reference(&mut self, detection: &Detection) -> Result<(), CalibrationError> {
        match &mut self.state {
            State::AwaitingReference { selected } => {
                *selected = Some(*detection);
                trace_debug!(
                    "reference_selected",
                    class_id = detection.class_id,
                    confidence = detection.confidence
                );
                Ok(())
            }
            _ => Err(self.invalid_state("select a reference")),
        }
    }

    /// Derives `pixels_per_mm` from the selected reference and enters
    /// `Calibrated`, returning the new factor.
    pub fn complete_calibration(&mut self) -> Result<f32, CalibrationError> {
        let (Some(reference_mm), State::AwaitingReference { selected: Some(reference) }) =
            (self.reference_size_mm, &self.state)
        else {
            return Err(CalibrationError::IncompleteSelection);
        };

        let diameter_px = reference.diameter_px(self.input_size);
        let pixels_per_mm = diameter_px / reference_mm;
        if !(pixels_per_mm.is_finite() && pixels_per_mm > 0.0) {
            return Err(CalibrationError::DegenerateReference { diameter_px });
        }

        self.state = State::Calibrated { pixels_per_mm };
        trace_debug!(
            "calibration_completed",
            diameter_px = diameter_px,
            pixels_per_mm = pixels_per_mm
        );
        Ok(pixels_per_mm)
    }

    /// Returns to `Uncalibrated`, dropping any selection and factor.
    ///
    /// The reference size is kept so the user can recalibrate directly.
    pub fn reset(&mut self) {
        self.state = State::Uncalibrated;
        trace_debug!("calibration_reset");
    }

    /// Physical diameter of `detection` in millimeters.
    ///
    /// `None` unless calibrated with a finite, non-zero factor.
    pub fn physical_size(&self, detection: &Detection) -> Option<f32> {
        let pixels_per_mm = self.pixels_per_mm()?;
        if !pixels_per_mm.is_finite() || pixels_per_mm == 0.0 {
            return None;
        }
        Some(detection.diameter_px(self.input_size) / pixels_per_mm)
    }

    fn invalid_state(&self, op: &'static str) -> CalibrationError {
        CalibrationError::InvalidState {
            op,
            mode: self.mode().as_str(),
        }
    }
}

fn validate_size(mm: f32) -> Result<(), CalibrationError> {
    if mm.is_finite() && mm > 0.0 {
        Ok(())
    } else {
        Err(CalibrationError::InvalidReferenceSize { value: mm })
    }
}
