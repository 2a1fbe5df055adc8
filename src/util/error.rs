//! Error types for ringgauge.

use thiserror::Error;

/// Result alias for ringgauge operations.
pub type RingGaugeResult<T> = std::result::Result<T, RingGaugeError>;

/// Errors raised while turning a raw model tensor into detections.
///
/// A decode error is fatal to the current frame only; callers skip the frame
/// and try again with the next one.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DecodeError {
    /// The shape descriptor does not have exactly three dimensions.
    #[error("tensor shape must have 3 dimensions, got {got}")]
    ShapeArity { got: usize },
    /// Only single-frame inference is supported.
    #[error("batch size must be 1, got {got}")]
    UnsupportedBatch { got: usize },
    /// The per-row attribute count does not match `5 + classes`.
    #[error("expected {expected} attributes per row, got {got}")]
    AttributeCount { expected: usize, got: usize },
    /// `rows * attrs` does not fit in `usize`.
    #[error("tensor with {num_boxes} rows is too large to address")]
    ShapeOverflow { num_boxes: usize },
    /// The flat buffer length disagrees with the shape.
    #[error("tensor buffer holds {got} values, shape requires {expected}")]
    BufferSize { expected: usize, got: usize },
    /// The confidence threshold is not a finite number.
    #[error("confidence threshold must be finite, got {value}")]
    InvalidThreshold { value: f32 },
}

/// Errors raised by the calibration workflow.
///
/// Every variant is recoverable; the calibration state is left exactly as it
/// was before the rejected call.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum CalibrationError {
    /// The reference size is not a positive finite number of millimeters.
    #[error("reference size must be a positive finite number of millimeters, got {value}")]
    InvalidReferenceSize { value: f32 },
    /// Calibration was started before a reference size was entered.
    #[error("enter a reference size before starting calibration")]
    MissingReferenceSize,
    /// Completion was requested without a selected reference detection.
    #[error("select a reference detection before completing calibration")]
    IncompleteSelection,
    /// The operation is not allowed in the current mode.
    #[error("cannot {op} while {mode}")]
    InvalidState {
        op: &'static str,
        mode: &'static str,
    },
    /// A persisted scale factor is not a positive finite number.
    #[error("pixels per millimeter must be a positive finite number, got {value}")]
    InvalidScale { value: f32 },
    /// The selected reference has no usable pixel diameter.
    #[error("reference detection has a degenerate diameter of {diameter_px} px")]
    DegenerateReference { diameter_px: f32 },
}

/// Errors that can occur anywhere in ringgauge.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum RingGaugeError {
    /// The model output could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// A calibration step was rejected.
    #[error(transparent)]
    Calibration(#[from] CalibrationError),
    /// A configuration value is out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}
