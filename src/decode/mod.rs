//! Decoding of raw YOLO-style output tensors into detections.
//!
//! The model emits one row per anchor, `[cx, cy, w, h, objectness, s0..s5]`,
//! laid out row-major in a flat `f32` buffer of shape `[1, rows, 11]`. Each row
//! picks its best class (lowest index wins ties), scores it as
//! `objectness * class_score`, and survives only when that product is strictly
//! above the configured threshold. Output keeps row order.

#[cfg(feature = "rayon")]
pub(crate) mod rayon;

use crate::detection::{Detection, NUM_CLASSES};
use crate::trace::{trace_event, trace_span};
use crate::util::DecodeError;

/// Box geometry plus objectness columns preceding the class scores.
pub const BOX_ATTRS: usize = 5;

/// Attributes per row: box, objectness and one score per class.
pub const NUM_ATTRS: usize = BOX_ATTRS + NUM_CLASSES;

/// Default minimum confidence; rows at exactly this value are dropped.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.4;

/// Decoder configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecodeConfig {
    /// Rows with `confidence <= confidence_threshold` are discarded.
    pub confidence_threshold: f32,
    /// Decode rows in parallel (requires the `rayon` feature; ignored otherwise).
    pub parallel: bool,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            parallel: false,
        }
    }
}

impl DecodeConfig {
    /// Checks that the threshold is usable.
    pub fn validate(&self) -> Result<(), DecodeError> {
        if !self.confidence_threshold.is_finite() {
            return Err(DecodeError::InvalidThreshold {
                value: self.confidence_threshold,
            });
        }
        Ok(())
    }
}

/// Validated `[batch, rows, attrs]` shape descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TensorShape {
    num_boxes: usize,
    len: usize,
}

impl TensorShape {
    /// Validates a raw shape descriptor against the fixed model layout.
    pub fn new(dims: &[usize]) -> Result<Self, DecodeError> {
        let &[batch, num_boxes, num_attrs] = dims else {
            return Err(DecodeError::ShapeArity { got: dims.len() });
        };
        if batch != 1 {
            return Err(DecodeError::UnsupportedBatch { got: batch });
        }
        if num_attrs != NUM_ATTRS {
            return Err(DecodeError::AttributeCount {
                expected: NUM_ATTRS,
                got: num_attrs,
            });
        }
        let len = num_boxes
            .checked_mul(NUM_ATTRS)
            .ok_or(DecodeError::ShapeOverflow { num_boxes })?;
        Ok(Self { num_boxes, len })
    }

    /// Number of candidate rows.
    pub fn num_boxes(&self) -> usize {
        self.num_boxes
    }

    /// Flat buffer length this shape requires.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true when the shape holds no rows.
    pub fn is_empty(&self) -> bool {
        self.num_boxes == 0
    }
}

/// Decodes a flat output tensor into detections above the threshold.
///
/// Fails fast on a malformed shape or a buffer whose length disagrees with
/// it; nothing is emitted for a rejected frame.
pub fn decode(
    tensor: &[f32],
    dims: &[usize],
    cfg: &DecodeConfig,
) -> Result<Vec<Detection>, DecodeError> {
    cfg.validate()?;
    let shape = TensorShape::new(dims)?;
    let rows = checked_rows(tensor, shape)?;

    let _span = trace_span!(
        "decode",
        rows = shape.num_boxes(),
        threshold = cfg.confidence_threshold
    )
    .entered();

    #[cfg(feature = "rayon")]
    {
        if cfg.parallel {
            let out = self::rayon::decode_rows_par(rows, cfg.confidence_threshold);
            trace_event!("decoded", kept = out.len());
            return Ok(out);
        }
    }

    let out: Vec<Detection> = rows
        .chunks_exact(NUM_ATTRS)
        .filter_map(|row| decode_row(row, cfg.confidence_threshold))
        .collect();
    trace_event!("decoded", kept = out.len());
    Ok(out)
}

fn checked_rows(tensor: &[f32], shape: TensorShape) -> Result<&[f32], DecodeError> {
    let expected = shape.len();
    if tensor.len() != expected {
        return Err(DecodeError::BufferSize {
            expected,
            got: tensor.len(),
        });
    }
    Ok(tensor)
}

/// Decodes a single `NUM_ATTRS`-wide row, or `None` if it is filtered out.
pub(crate) fn decode_row(row: &[f32], threshold: f32) -> Option<Detection> {
    let (geometry, scores) = row.split_at(BOX_ATTRS);
    let (class_id, class_score) = argmax_first(scores)?;
    let confidence = geometry[4] * class_score;
    if confidence > threshold {
        Some(Detection::from_center(
            geometry[0],
            geometry[1],
            geometry[2],
            geometry[3],
            class_id,
            confidence,
        ))
    } else {
        None
    }
}

/// Index and value of the largest score; the first maximum wins ties.
fn argmax_first(scores: &[f32]) -> Option<(usize, f32)> {
    let (&first, rest) = scores.split_first()?;
    let mut best = (0, first);
    for (idx, &score) in rest.iter().enumerate() {
        if score > best.1 {
            best = (idx + 1, score);
        }
    }
    Some(best)
}
