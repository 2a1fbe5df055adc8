//! Per-frame decode and suppression behind one configuration.

use crate::decode::{decode, DecodeConfig};
use crate::detection::Detection;
use crate::suppress::{suppress, NmsConfig};
use crate::util::RingGaugeResult;

/// Combined decode and suppression settings.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PipelineConfig {
    pub decode: DecodeConfig,
    pub nms: NmsConfig,
}

impl PipelineConfig {
    /// Validates both stages.
    pub fn validate(&self) -> RingGaugeResult<()> {
        self.decode.validate()?;
        self.nms.validate()
    }
}

/// Turns raw model output into the final detection list for a frame.
///
/// The detector holds no per-frame state, so results arriving out of order
/// are processed independently; discarding stale frames is up to the caller.
#[derive(Clone, Debug, Default)]
pub struct Detector {
    cfg: PipelineConfig,
}

impl Detector {
    /// Creates a detector with default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, cfg: PipelineConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.cfg
    }

    /// Decodes `tensor` with shape `dims` and suppresses duplicates.
    ///
    /// The result is ordered by descending confidence.
    pub fn detect(&self, tensor: &[f32], dims: &[usize]) -> RingGaugeResult<Vec<Detection>> {
        self.cfg.validate()?;
        let candidates = decode(tensor, dims, &self.cfg.decode)?;
        Ok(suppress(&candidates, &self.cfg.nms))
    }
}
