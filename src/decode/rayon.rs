//! Row-parallel decoding (feature-gated).
//!
//! Rows are independent, so each worker decodes whole rows and the indexed
//! collect keeps the sequential row order.

use super::{decode_row, NUM_ATTRS};
use crate::detection::Detection;
use rayon::prelude::*;

/// Parallel counterpart of the sequential row loop; output order is identical.
pub(crate) fn decode_rows_par(rows: &[f32], threshold: f32) -> Vec<Detection> {
    rows.par_chunks_exact(NUM_ATTRS)
        .filter_map(|row| decode_row(row, threshold))
        .collect()
}
