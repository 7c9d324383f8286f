//! Padding detection for variable-length sequences.

use crate::errors::EvaluationResult;
use crate::recurrent::{RecurrentLayer, ScanContext};
use ndarray::{Array2, Axis};

/// Flags timesteps whose input column sums to exactly zero as padding.
///
/// The mask is stored in the [`ScanContext`] for consumption by subsequent
/// gated layers; the input passes through unchanged.
pub struct MaskingLayer {
    n_outputs: usize,
}

impl MaskingLayer {
    pub fn new(n_inputs: usize) -> Self {
        Self {
            n_outputs: n_inputs,
        }
    }
}

impl RecurrentLayer for MaskingLayer {
    fn scan(
        &self,
        input: &Array2<f64>,
        context: &mut ScanContext,
    ) -> EvaluationResult<Array2<f64>> {
        let mask = input
            .sum_axis(Axis(0))
            .iter()
            .map(|&column_sum| column_sum == 0.0)
            .collect();
        context.set_mask(mask);
        Ok(input.clone())
    }

    fn n_outputs(&self) -> usize {
        self.n_outputs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    #[test]
    fn test_zero_columns_flagged() {
        let layer = MaskingLayer::new(2);
        let mut context = ScanContext::new();
        let input = arr2(&[[1.0, 0.0, 0.5, 0.0], [2.0, 0.0, -0.5, 0.0]]);

        let out = layer.scan(&input, &mut context).unwrap();
        assert_eq!(out, input);
        assert_eq!(
            context.mask_for(4).unwrap().unwrap(),
            &[false, true, true, true][..]
        );
    }

    #[test]
    fn test_cancelling_column_counts_as_padding() {
        // The padding test is on the column sum, so +1/-1 sums to zero.
        let layer = MaskingLayer::new(2);
        let mut context = ScanContext::new();
        let input = arr2(&[[1.0], [-1.0]]);

        layer.scan(&input, &mut context).unwrap();
        assert_eq!(context.mask_for(1).unwrap().unwrap(), &[true][..]);
    }
}
