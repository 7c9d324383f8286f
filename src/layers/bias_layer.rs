//! Bias-add layer.

use crate::layers::Layer;
use ndarray::Array1;

/// Adds a fixed bias vector to the input.
pub struct BiasLayer {
    bias: Array1<f64>,
}

impl BiasLayer {
    pub fn new(bias: Array1<f64>) -> Self {
        Self { bias }
    }
}

impl Layer for BiasLayer {
    fn compute(&self, input: &Array1<f64>) -> Array1<f64> {
        input + &self.bias
    }
}
