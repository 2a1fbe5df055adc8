//! Python bindings for the ringgauge detection and calibration core.
//!
//! Exposes decoding, suppression and the calibration workflow so a Python
//! host can feed raw model outputs straight from its inference runtime.

use numpy::{PyReadonlyArrayDyn, PyUntypedArrayMethods};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use ringgauge::{
    intersection_over_union, BBox, Calibration as RustCalibration, CalibrationError,
    CalibrationMode, DecodeConfig, Detection as RustDetection, Detector, NmsConfig,
    PipelineConfig, RingGaugeError,
};

/// Decode and config errors map to ValueError.
fn to_value_err(err: RingGaugeError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// Calibration workflow errors map to RuntimeError.
fn to_calibration_err(err: CalibrationError) -> PyErr {
    PyRuntimeError::new_err(err.to_string())
}

/// One detection in normalized model-input coordinates.
#[pyclass]
#[derive(Clone)]
pub struct Detection {
    inner: RustDetection,
}

#[pymethods]
impl Detection {
    /// Class name, e.g. "OK" or "TEAR".
    #[getter]
    fn label(&self) -> &'static str {
        self.inner.label
    }

    /// Index into the fixed class list.
    #[getter]
    fn class_id(&self) -> usize {
        self.inner.class_id
    }

    /// Objectness times class score.
    #[getter]
    fn confidence(&self) -> f32 {
        self.inner.confidence
    }

    /// Corner-form box as (x1, y1, x2, y2).
    #[getter]
    fn bbox(&self) -> (f32, f32, f32, f32) {
        let b = self.inner.bbox;
        (b.x1, b.y1, b.x2, b.y2)
    }

    /// Raw center-form width.
    #[getter]
    fn width(&self) -> f32 {
        self.inner.width
    }

    /// Raw center-form height.
    #[getter]
    fn height(&self) -> f32 {
        self.inner.height
    }

    fn __eq__(&self, other: PyRef<'_, Detection>) -> bool {
        self.inner == other.inner
    }

    fn __repr__(&self) -> String {
        let b = self.inner.bbox;
        format!(
            "Detection(label='{}', confidence={:.4}, bbox=({:.4}, {:.4}, {:.4}, {:.4}))",
            self.inner.label, self.inner.confidence, b.x1, b.y1, b.x2, b.y2
        )
    }
}

impl From<RustDetection> for Detection {
    fn from(inner: RustDetection) -> Self {
        Self { inner }
    }
}

/// Pixel-to-millimeter calibration workflow.
#[pyclass]
pub struct Calibration {
    inner: RustCalibration,
}

#[pymethods]
impl Calibration {
    /// Create an uncalibrated state.
    ///
    /// Args:
    ///     input_size: Model input side length in pixels (default: 640)
    #[new]
    #[pyo3(signature = (input_size = 640.0))]
    fn new(input_size: f32) -> PyResult<Self> {
        let inner = RustCalibration::new()
            .with_input_size(input_size)
            .map_err(to_value_err)?;
        Ok(Self { inner })
    }

    /// Rebuild a calibrated state from persisted values.
    #[staticmethod]
    fn restore(reference_size_mm: f32, pixels_per_mm: f32) -> PyResult<Self> {
        let inner = RustCalibration::restore(reference_size_mm, pixels_per_mm)
            .map_err(to_calibration_err)?;
        Ok(Self { inner })
    }

    /// "uncalibrated", "awaiting_reference" or "calibrated".
    #[getter]
    fn mode(&self) -> &'static str {
        match self.inner.mode() {
            CalibrationMode::Uncalibrated => "uncalibrated",
            CalibrationMode::AwaitingReference => "awaiting_reference",
            CalibrationMode::Calibrated => "calibrated",
        }
    }

    #[getter]
    fn reference_size_mm(&self) -> Option<f32> {
        self.inner.reference_size_mm()
    }

    #[getter]
    fn pixels_per_mm(&self) -> Option<f32> {
        self.inner.pixels_per_mm()
    }

    #[getter]
    fn selected_reference(&self) -> Option<Detection> {
        self.inner.selected_reference().copied().map(Detection::from)
    }

    fn set_reference_size(&mut self, mm: f32) -> PyResult<()> {
        self.inner.set_reference_size(mm).map_err(to_calibration_err)
    }

    fn start(&mut self) -> PyResult<()> {
        self.inner.start_calibration().map_err(to_calibration_err)
    }

    fn select_reference(&mut self, detection: PyRef<'_, Detection>) -> PyResult<()> {
        self.inner
            .select_reference(&detection.inner)
            .map_err(to_calibration_err)
    }

    /// Derive and return pixels_per_mm.
    fn complete(&mut self) -> PyResult<f32> {
        self.inner.complete_calibration().map_err(to_calibration_err)
    }

    fn reset(&mut self) {
        self.inner.reset();
    }

    /// Physical diameter in millimeters, or None when not calibrated.
    fn physical_size(&self, detection: PyRef<'_, Detection>) -> Option<f32> {
        self.inner.physical_size(&detection.inner)
    }

    fn __repr__(&self) -> String {
        format!(
            "Calibration(mode='{}', pixels_per_mm={:?})",
            self.mode(),
            self.inner.pixels_per_mm()
        )
    }
}

fn run_detector(
    tensor: PyReadonlyArrayDyn<'_, f32>,
    cfg: PipelineConfig,
    with_nms: bool,
) -> PyResult<Vec<Detection>> {
    let shape = tensor.shape().to_vec();
    let data = tensor.as_slice()?;
    let dets = if with_nms {
        Detector::new()
            .with_config(cfg)
            .detect(data, &shape)
            .map_err(to_value_err)?
    } else {
        ringgauge::decode(data, &shape, &cfg.decode)
            .map_err(|e| to_value_err(e.into()))?
    };
    Ok(dets.into_iter().map(Detection::from).collect())
}

/// Decode a (1, N, 11) float32 output tensor without suppression.
#[pyfunction]
#[pyo3(signature = (tensor, confidence_threshold = 0.4, parallel = false))]
fn decode(
    tensor: PyReadonlyArrayDyn<'_, f32>,
    confidence_threshold: f32,
    parallel: bool,
) -> PyResult<Vec<Detection>> {
    let cfg = PipelineConfig {
        decode: DecodeConfig {
            confidence_threshold,
            parallel,
        },
        ..PipelineConfig::default()
    };
    run_detector(tensor, cfg, false)
}

/// Class-wise non-maximum suppression, best first.
#[pyfunction]
#[pyo3(signature = (detections, iou_threshold = 0.5))]
fn suppress(
    detections: Vec<PyRef<'_, Detection>>,
    iou_threshold: f32,
) -> PyResult<Vec<Detection>> {
    let cfg = NmsConfig { iou_threshold };
    cfg.validate().map_err(to_value_err)?;
    let input: Vec<RustDetection> = detections.iter().map(|d| d.inner).collect();
    Ok(ringgauge::suppress(&input, &cfg)
        .into_iter()
        .map(Detection::from)
        .collect())
}

/// Decode and suppress in one call.
#[pyfunction]
#[pyo3(signature = (tensor, confidence_threshold = 0.4, iou_threshold = 0.5, parallel = false))]
fn detect(
    tensor: PyReadonlyArrayDyn<'_, f32>,
    confidence_threshold: f32,
    iou_threshold: f32,
    parallel: bool,
) -> PyResult<Vec<Detection>> {
    let cfg = PipelineConfig {
        decode: DecodeConfig {
            confidence_threshold,
            parallel,
        },
        nms: NmsConfig { iou_threshold },
    };
    run_detector(tensor, cfg, true)
}

/// IoU of two (x1, y1, x2, y2) boxes.
#[pyfunction]
fn iou(a: (f32, f32, f32, f32), b: (f32, f32, f32, f32)) -> f32 {
    let a = BBox::new(a.0, a.1, a.2, a.3);
    let b = BBox::new(b.0, b.1, b.2, b.3);
    intersection_over_union(&a, &b)
}

/// Python module for ringgauge.
#[pymodule]
fn _ringgauge(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<Detection>()?;
    m.add_class::<Calibration>()?;
    m.add_function(wrap_pyfunction!(decode, m)?)?;
    m.add_function(wrap_pyfunction!(suppress, m)?)?;
    m.add_function(wrap_pyfunction!(detect, m)?)?;
    m.add_function(wrap_pyfunction!(iou, m)?)?;
    m.add("CLASS_NAMES", ringgauge::CLASS_NAMES.to_vec())?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
