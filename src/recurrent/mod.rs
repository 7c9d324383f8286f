//! Recurrent layer implementations.
//!
//! A recurrent layer transforms a sequence, represented as a matrix whose
//! columns are timesteps, into another sequence (or, for gated layers with
//! `return_sequences` off, a single final column). Layer parameters are
//! immutable after construction; all per-call working state (hidden and cell
//! buffers, the padding mask) lives either in locals inside `scan` or in the
//! explicit [`ScanContext`] threaded through one stack invocation.

use crate::errors::{EvaluationError, EvaluationResult};
use ndarray::Array2;

pub mod embedding_layer;
pub mod gru_layer;
pub mod lstm_layer;
pub mod masking_layer;
pub mod time_distributed_merge;

pub use embedding_layer::EmbeddingLayer;
pub use gru_layer::GruLayer;
pub use lstm_layer::LstmLayer;
pub use masking_layer::MaskingLayer;
pub use time_distributed_merge::TimeDistributedMergeLayer;

/// Transient working state shared by the layers of one stack invocation.
///
/// A [`MaskingLayer`] stores the padding mask here; every subsequent gated
/// layer in the same invocation consumes the most recently stored mask. The
/// context is created fresh for each `scan`/`reduce` call and is meaningless
/// outside of it.
#[derive(Default)]
pub struct ScanContext {
    mask: Option<Vec<bool>>,
}

impl ScanContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the active padding mask. One entry per timestep; `true`
    /// marks padding.
    pub fn set_mask(&mut self, mask: Vec<bool>) {
        self.mask = Some(mask);
    }

    /// The active padding mask, if any, validated against the timestep count
    /// of the sequence about to be scanned.
    pub fn mask_for(&self, timesteps: usize) -> EvaluationResult<Option<&[bool]>> {
        match &self.mask {
            None => Ok(None),
            Some(mask) if mask.len() == timesteps => Ok(Some(mask)),
            Some(mask) => Err(EvaluationError::MaskLengthMismatch {
                mask_len: mask.len(),
                timesteps,
            }),
        }
    }
}

/// Base trait for all recurrent layer types.
pub trait RecurrentLayer: Send + Sync {
    /// Transforms a sequence into an output sequence, reading and writing
    /// per-call state through the context.
    fn scan(&self, input: &Array2<f64>, context: &mut ScanContext)
        -> EvaluationResult<Array2<f64>>;

    /// Number of rows of the output sequence.
    fn n_outputs(&self) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_length_validated() {
        let mut context = ScanContext::new();
        assert!(matches!(context.mask_for(4), Ok(None)));

        context.set_mask(vec![false, true, false]);
        assert!(context.mask_for(3).unwrap().is_some());
        assert!(matches!(
            context.mask_for(4),
            Err(EvaluationError::MaskLengthMismatch {
                mask_len: 3,
                timesteps: 4
            })
        ));
    }
}
