//! Affine transform layer.

use crate::layers::Layer;
use ndarray::{Array1, Array2};

/// Left-multiplies the input by a fixed weight matrix.
pub struct MatrixLayer {
    matrix: Array2<f64>,
}

impl MatrixLayer {
    pub fn new(matrix: Array2<f64>) -> Self {
        Self { matrix }
    }

    /// Output width of the transform.
    pub fn n_outputs(&self) -> usize {
        self.matrix.nrows()
    }
}

impl Layer for MatrixLayer {
    fn compute(&self, input: &Array1<f64>) -> Array1<f64> {
        self.matrix.dot(input)
    }
}
