//! Activation functions for neural network layers.
//!
//! Each activation is a pure scalar transform, except Softmax which operates
//! on a whole vector. The functions here are applied either elementwise by a
//! feed-forward [`crate::layers::ActivationLayer`] or inside the gated
//! recurrence equations of the LSTM and GRU layers.

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Saturation bound for the sigmoid: beyond it the exponential would lose all
/// precision anyway, so the output is pinned to an exact 0 or 1.
const SIGMOID_CUTOFF: f64 = 30.0;

/// Represents the type of activation function to be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Activation {
    /// Identity function: f(x) = x.
    Linear,
    /// Logistic sigmoid: f(x) = 1 / (1 + exp(-x)), saturating to an exact
    /// 0 or 1 when |x| >= 30 to avoid overflow in the exponential.
    Sigmoid,
    /// Piecewise-linear sigmoid approximation: f(x) = clamp(0.2x + 0.5, 0, 1).
    HardSigmoid,
    /// Rectified Linear Unit: f(x) = max(0, x).
    Rectified,
    /// Hyperbolic tangent: f(x) = tanh(x).
    Tanh,
    /// Softmax over a full vector:
    ///
    /// ```text
    /// Softmax(x_i) = exp(x_i - max(x)) / sum_j exp(x_j - max(x))
    /// ```
    ///
    /// The maximum is subtracted before exponentiating so large logits do not
    /// overflow, matching the convention of common training frameworks.
    Softmax,
}

impl Activation {
    /// Get activation by string name.
    pub fn get_by_name(type_name: &str) -> Option<Self> {
        let map: HashMap<&str, Activation> = [
            ("LINEAR", Activation::Linear),
            ("SIGMOID", Activation::Sigmoid),
            ("HARD_SIGMOID", Activation::HardSigmoid),
            ("RECTIFIED", Activation::Rectified),
            ("TANH", Activation::Tanh),
            ("SOFTMAX", Activation::Softmax),
        ]
        .iter()
        .cloned()
        .collect();

        map.get(type_name).copied()
    }

    /// Apply the activation function to a single value.
    ///
    /// Softmax is a vector operation; applying it to a single value returns
    /// the unnormalized exp(x). Use [`Activation::apply`] for proper softmax.
    pub fn apply_single(self, x: f64) -> f64 {
        match self {
            Activation::Linear => x,
            Activation::Sigmoid => {
                if x < -SIGMOID_CUTOFF {
                    0.0
                } else if x > SIGMOID_CUTOFF {
                    1.0
                } else {
                    1.0 / (1.0 + (-x).exp())
                }
            }
            Activation::HardSigmoid => (0.2 * x + 0.5).clamp(0.0, 1.0),
            Activation::Rectified => x.max(0.0),
            Activation::Tanh => x.tanh(),
            Activation::Softmax => x.exp(),
        }
    }

    /// Apply the activation function to a vector.
    pub fn apply(self, values: &Array1<f64>) -> Array1<f64> {
        match self {
            Activation::Softmax => {
                if values.is_empty() {
                    return values.clone();
                }
                let max_val = values.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
                let exponentials = values.mapv(|v| (v - max_val).exp());
                let sum = exponentials.sum();
                exponentials / sum
            }
            _ => values.mapv(|v| self.apply_single(v)),
        }
    }
}
