//! RingGauge turns raw YOLO-style detector output into stable seal
//! detections and physical measurements.
//!
//! The crate covers the numeric layer between an inference engine and a
//! renderer: decoding the flat output tensor, class-wise non-maximum
//! suppression, and a pixel-to-millimeter calibration workflow. It performs no
//! I/O and never touches the camera, canvas or model runtime. Row decoding can
//! run in parallel via the `rayon` feature, and spans/events are emitted with
//! the `tracing` feature.

pub mod calibration;
pub mod decode;
pub mod detection;
pub mod geometry;
pub mod pipeline;
pub mod suppress;
mod trace;
pub mod util;

pub use calibration::{measure, Calibration, CalibrationMode, Measurement, MODEL_INPUT_SIZE};
pub use decode::{decode, DecodeConfig, TensorShape, NUM_ATTRS};
pub use detection::{class_name, hit_test, Detection, SealClass, CLASS_NAMES, UNKNOWN_LABEL};
pub use geometry::{intersection_over_union, BBox, FrameScale};
pub use pipeline::{Detector, PipelineConfig};
pub use suppress::{suppress, NmsConfig};
pub use util::{CalibrationError, DecodeError, RingGaugeError, RingGaugeResult};
