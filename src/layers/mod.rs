//! Feed-forward layer implementations.
//!
//! A layer is a stateless transform of one vector into another. The three
//! primitive kinds here (affine, bias, activation) are composed in order by
//! [`crate::Stack`], which derives them from the declared layer
//! configurations.

use ndarray::Array1;

pub mod activation_layer;
pub mod bias_layer;
pub mod matrix_layer;

pub use activation_layer::ActivationLayer;
pub use bias_layer::BiasLayer;
pub use matrix_layer::MatrixLayer;

/// Base trait for all feed-forward layer types.
///
/// `compute` is total over well-formed input: a vector of the width the
/// owning stack was built for never fails. Feeding a vector of the wrong
/// width is a caller contract violation, not a recoverable error.
pub trait Layer: Send + Sync {
    /// Transforms one vector into another.
    fn compute(&self, input: &Array1<f64>) -> Array1<f64>;
}
