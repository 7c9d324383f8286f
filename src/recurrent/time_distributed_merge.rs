//! Row-wise merge of two sequences.

use crate::errors::{EvaluationError, EvaluationResult};
use ndarray::{concatenate, Array2, Axis};

/// Concatenates two sequences row-wise, timestep by timestep.
///
/// Both sequences must cover the same timesteps; a differing column count is
/// an evaluation error since it depends on runtime data shape, not on the
/// declared configuration.
pub struct TimeDistributedMergeLayer {
    n_outputs: usize,
}

impl TimeDistributedMergeLayer {
    pub fn new(n_rows_first: usize, n_rows_second: usize) -> Self {
        Self {
            n_outputs: n_rows_first + n_rows_second,
        }
    }

    /// Stacks `first` on top of `second`.
    pub fn scan(&self, first: &Array2<f64>, second: &Array2<f64>) -> EvaluationResult<Array2<f64>> {
        if first.ncols() != second.ncols() {
            return Err(EvaluationError::TimestepCountMismatch {
                left: first.ncols(),
                right: second.ncols(),
            });
        }
        Ok(concatenate(Axis(0), &[first.view(), second.view()])
            .expect("row-wise concatenation of equal-width sequences cannot fail"))
    }

    pub fn n_outputs(&self) -> usize {
        self.n_outputs
    }
}
