//! Ordered composition of feed-forward layers.

use crate::activation::Activation;
use crate::errors::{ConfigurationError, ConfigurationResult};
use crate::layers::{ActivationLayer, BiasLayer, Layer, MatrixLayer};
use crate::model_config::{Architecture, LayerConfig};
use crate::utils::matrix::{build_matrix, build_vector};
use ndarray::Array1;

/// An ordered pipeline of feed-forward layers with a fixed input and output
/// width, built once from configuration.
///
/// Each `DENSE` layer configuration contributes up to three primitive layers:
/// an affine transform when `weights` is non-empty, a bias add when `bias` is
/// non-empty, and an activation when it is not `LINEAR`. The output width is
/// tracked while appending and every declared shape is validated against it;
/// an inconsistency is a [`ConfigurationError`] and construction aborts.
pub struct Stack {
    layers: Vec<Box<dyn Layer>>,
    n_outputs: usize,
}

impl Stack {
    /// Builds a stack from an ordered list of layer configurations.
    pub fn new(n_inputs: usize, configs: &[LayerConfig]) -> ConfigurationResult<Self> {
        let mut layers: Vec<Box<dyn Layer>> = Vec::new();
        let mut width = n_inputs;
        for config in configs {
            width = Self::add_layers(&mut layers, width, config)?;
        }
        Ok(Self {
            layers,
            n_outputs: width,
        })
    }

    /// Appends the primitive layers declared by one configuration, returning
    /// the new running width.
    fn add_layers(
        layers: &mut Vec<Box<dyn Layer>>,
        width: usize,
        config: &LayerConfig,
    ) -> ConfigurationResult<usize> {
        if config.architecture != Architecture::Dense {
            return Err(ConfigurationError::UnexpectedArchitecture {
                architecture: config.architecture.as_str().to_string(),
            });
        }

        let mut width = width;
        if !config.weights.is_empty() {
            let matrix = build_matrix(&config.weights, width)?;
            width = matrix.nrows();
            layers.push(Box::new(MatrixLayer::new(matrix)));
        }
        if !config.bias.is_empty() {
            let bias = build_vector(&config.bias, width)?;
            layers.push(Box::new(BiasLayer::new(bias)));
        }
        if config.activation != Activation::Linear {
            layers.push(Box::new(ActivationLayer::new(config.activation)));
        }
        Ok(width)
    }

    /// Folds the input vector through every layer in order.
    pub fn compute(&self, input: &Array1<f64>) -> Array1<f64> {
        let mut value = input.clone();
        for layer in &self.layers {
            value = layer.compute(&value);
        }
        value
    }

    /// Final output width, fixed at construction.
    pub fn n_outputs(&self) -> usize {
        self.n_outputs
    }
}
