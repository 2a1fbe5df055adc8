//! Shared utility helpers.

pub mod error;

pub use error::{CalibrationError, DecodeError, RingGaugeError, RingGaugeResult};
