//! Activation-application layer.

use crate::activation::Activation;
use crate::layers::Layer;
use ndarray::Array1;

/// Applies an activation function elementwise, or vector-wise for softmax.
pub struct ActivationLayer {
    activation: Activation,
}

impl ActivationLayer {
    pub fn new(activation: Activation) -> Self {
        Self { activation }
    }
}

impl Layer for ActivationLayer {
    fn compute(&self, input: &Array1<f64>) -> Array1<f64> {
        self.activation.apply(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    #[test]
    fn test_rectified_application() {
        let layer = ActivationLayer::new(Activation::Rectified);
        assert_eq!(
            layer.compute(&arr1(&[-1.0, 0.0, 3.0])),
            arr1(&[0.0, 0.0, 3.0])
        );
    }
}
