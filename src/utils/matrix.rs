//! Builders turning flat configuration arrays into ndarray structures.

use crate::errors::{ConfigurationError, ConfigurationResult};
use ndarray::{Array1, Array2};

/// Builds a weight matrix from a flat row-major coefficient array.
///
/// The row count is inferred from the array length and the declared input
/// width; a length that is not a multiple of `n_inputs` is a configuration
/// error.
pub(crate) fn build_matrix(weights: &[f64], n_inputs: usize) -> ConfigurationResult<Array2<f64>> {
    if weights.is_empty() || n_inputs == 0 {
        return Err(ConfigurationError::EmptyWeights);
    }
    if weights.len() % n_inputs != 0 {
        return Err(ConfigurationError::InvalidWeightCount {
            n_weights: weights.len(),
            n_inputs,
        });
    }
    let n_outputs = weights.len() / n_inputs;
    let matrix = Array2::from_shape_vec((n_outputs, n_inputs), weights.to_vec())
        .expect("shape follows from the length checks above");
    Ok(matrix)
}

/// Builds a bias vector, checking its length against the layer width.
pub(crate) fn build_vector(bias: &[f64], width: usize) -> ConfigurationResult<Array1<f64>> {
    if bias.len() != width {
        return Err(ConfigurationError::BiasSizeMismatch {
            bias_size: bias.len(),
            width,
        });
    }
    Ok(Array1::from_vec(bias.to_vec()))
}
