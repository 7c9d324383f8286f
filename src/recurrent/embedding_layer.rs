//! Embedding lookup over one input row of a sequence.

use crate::errors::{ConfigurationError, ConfigurationResult, EvaluationError, EvaluationResult};
use crate::model_config::EmbeddingConfig;
use crate::recurrent::{RecurrentLayer, ScanContext};
use crate::utils::matrix::{build_matrix, build_vector};
use ndarray::{Array1, Array2};

/// Replaces each timestep with an embedding matrix column plus bias.
///
/// The lookup index is read from the configured input row; it must be a
/// non-negative integral value within the vocabulary, anything else is an
/// evaluation error. The output has one row per embedding dimension and the
/// same timestep count as the input.
pub struct EmbeddingLayer {
    var_row_index: usize,
    weights: Array2<f64>,
    bias: Array1<f64>,
}

impl EmbeddingLayer {
    pub fn new(config: &EmbeddingConfig, n_inputs: usize) -> ConfigurationResult<Self> {
        if config.index >= n_inputs {
            return Err(ConfigurationError::EmbeddingRowOutOfRange {
                index: config.index,
                n_inputs,
            });
        }
        if config.n_outputs == 0 || config.weights.len() % config.n_outputs != 0 {
            return Err(ConfigurationError::InvalidWeightCount {
                n_weights: config.weights.len(),
                n_inputs: config.n_outputs.max(1),
            });
        }
        let n_vocab = config.weights.len() / config.n_outputs;
        let weights = build_matrix(&config.weights, n_vocab)?;
        let bias = if config.bias.is_empty() {
            Array1::zeros(config.n_outputs)
        } else {
            build_vector(&config.bias, config.n_outputs)?
        };
        Ok(Self {
            var_row_index: config.index,
            weights,
            bias,
        })
    }

    /// Which input row holds the lookup index.
    pub fn var_row_index(&self) -> usize {
        self.var_row_index
    }
}

impl RecurrentLayer for EmbeddingLayer {
    fn scan(
        &self,
        input: &Array2<f64>,
        _context: &mut ScanContext,
    ) -> EvaluationResult<Array2<f64>> {
        let n_vocab = self.weights.ncols();
        let mut output = Array2::zeros((self.n_outputs(), input.ncols()));
        for (time, mut column) in output.axis_iter_mut(ndarray::Axis(1)).enumerate() {
            let raw = input[[self.var_row_index, time]];
            if raw < 0.0 || raw.fract() != 0.0 || raw as usize >= n_vocab {
                return Err(EvaluationError::EmbeddingIndexOutOfRange {
                    index: raw,
                    n_vocab,
                });
            }
            column.assign(&(&self.weights.column(raw as usize) + &self.bias));
        }
        Ok(output)
    }

    fn n_outputs(&self) -> usize {
        self.weights.nrows()
    }
}
