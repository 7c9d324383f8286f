//! Ordered composition of recurrent layers with an optional trailing
//! feed-forward stack.

use crate::errors::{ConfigurationResult, EvaluationError, EvaluationResult};
use crate::model_config::{Architecture, LayerConfig};
use crate::recurrent::{
    EmbeddingLayer, GruLayer, LstmLayer, MaskingLayer, RecurrentLayer, ScanContext,
    TimeDistributedMergeLayer,
};
use crate::stack::Stack;
use ndarray::{Array1, Array2, Axis};

/// Embedding of one input row merged with the remaining rows.
///
/// A sequence wider than the lookup row keeps its other feature rows: the
/// embedded row replaces the raw index and everything else passes through,
/// stacked below the embedding output.
struct MergedEmbeddingLayer {
    embedding: EmbeddingLayer,
    merge: TimeDistributedMergeLayer,
    passthrough_rows: Vec<usize>,
}

impl RecurrentLayer for MergedEmbeddingLayer {
    fn scan(
        &self,
        input: &Array2<f64>,
        context: &mut ScanContext,
    ) -> EvaluationResult<Array2<f64>> {
        let embedded = self.embedding.scan(input, context)?;
        let passthrough = input.select(Axis(0), &self.passthrough_rows);
        self.merge.scan(&embedded, &passthrough)
    }

    fn n_outputs(&self) -> usize {
        self.merge.n_outputs()
    }
}

/// An ordered pipeline of recurrent layers built once from configuration,
/// reducing a sequence to a fixed-size vector.
///
/// Layer configurations are consumed in order; the first `DENSE`
/// configuration and everything after it form a trailing feed-forward
/// [`Stack`] applied to the final timestep. The running sequence width is
/// tracked and validated exactly as in [`Stack`].
pub struct RecurrentStack {
    layers: Vec<Box<dyn RecurrentLayer>>,
    stack: Stack,
}

impl RecurrentStack {
    /// Builds a recurrent stack from an ordered list of layer configurations.
    pub fn new(n_inputs: usize, configs: &[LayerConfig]) -> ConfigurationResult<Self> {
        let mut layers: Vec<Box<dyn RecurrentLayer>> = Vec::new();
        let mut width = n_inputs;
        let mut trailing_stack = None;

        for (position, config) in configs.iter().enumerate() {
            match config.architecture {
                Architecture::Masking => {
                    layers.push(Box::new(MaskingLayer::new(width)));
                }
                Architecture::Embedding => {
                    let layer = Self::build_embedding(config, width)?;
                    width = layer.n_outputs();
                    layers.push(layer);
                }
                Architecture::Lstm => {
                    let layer = LstmLayer::new(config, width)?;
                    width = layer.n_outputs();
                    layers.push(Box::new(layer));
                }
                Architecture::Gru => {
                    let layer = GruLayer::new(config, width)?;
                    width = layer.n_outputs();
                    layers.push(Box::new(layer));
                }
                Architecture::Dense => {
                    // Everything from here on is post-recurrence processing.
                    trailing_stack = Some(Stack::new(width, &configs[position..])?);
                    break;
                }
            }
        }

        let stack = match trailing_stack {
            Some(stack) => stack,
            None => Stack::new(width, &[])?,
        };
        Ok(Self { layers, stack })
    }

    fn build_embedding(
        config: &LayerConfig,
        width: usize,
    ) -> ConfigurationResult<Box<dyn RecurrentLayer>> {
        let embedding_config = config
            .embedding
            .as_ref()
            .ok_or(crate::errors::ConfigurationError::MissingEmbedding)?;
        let embedding = EmbeddingLayer::new(embedding_config, width)?;
        if width == 1 {
            return Ok(Box::new(embedding));
        }
        let passthrough_rows = (0..width)
            .filter(|&row| row != embedding.var_row_index())
            .collect::<Vec<_>>();
        let merge = TimeDistributedMergeLayer::new(embedding.n_outputs(), width - 1);
        Ok(Box::new(MergedEmbeddingLayer {
            embedding,
            merge,
            passthrough_rows,
        }))
    }

    /// Folds the sequence through every recurrent layer in order, returning
    /// the transformed sequence. The trailing feed-forward stack is not
    /// applied here; use [`RecurrentStack::reduce`] for that.
    pub fn scan(&self, input: &Array2<f64>) -> EvaluationResult<Array2<f64>> {
        let mut context = ScanContext::new();
        self.scan_with_context(input, &mut context)
    }

    pub(crate) fn scan_with_context(
        &self,
        input: &Array2<f64>,
        context: &mut ScanContext,
    ) -> EvaluationResult<Array2<f64>> {
        let mut value = input.clone();
        for layer in &self.layers {
            value = layer.scan(&value, context)?;
        }
        Ok(value)
    }

    /// Reduces a sequence to a fixed-size vector: the final timestep of the
    /// scanned sequence, passed through the trailing feed-forward stack.
    pub fn reduce(&self, input: &Array2<f64>) -> EvaluationResult<Array1<f64>> {
        let sequence = self.scan(input)?;
        if sequence.ncols() == 0 {
            return Err(EvaluationError::EmptySequence);
        }
        let last = sequence.column(sequence.ncols() - 1).to_owned();
        Ok(self.stack.compute(&last))
    }

    /// Width of the reduced vector, fixed at construction.
    pub fn n_outputs(&self) -> usize {
        self.stack.n_outputs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::Activation;
    use crate::errors::ConfigurationError;
    use crate::model_config::{Component, EmbeddingConfig, GateConfig};
    use ndarray::arr2;
    use std::collections::HashMap;

    const DELTA: f64 = 1e-9;

    fn zero_lstm(return_sequences: bool) -> LayerConfig {
        let gate = GateConfig {
            weights: vec![0.0],
            recurrent_weights: vec![0.0],
            bias: vec![0.0],
        };
        let mut components = HashMap::new();
        for component in [Component::I, Component::F, Component::O, Component::C] {
            components.insert(component, gate.clone());
        }
        LayerConfig {
            architecture: Architecture::Lstm,
            weights: Vec::new(),
            bias: Vec::new(),
            activation: Activation::Tanh,
            inner_activation: Activation::HardSigmoid,
            components,
            embedding: None,
            return_sequences,
        }
    }

    #[test]
    fn test_lstm_then_dense_reduce() {
        let configs = [
            zero_lstm(false),
            // 1 -> 1 affine doubling plus bias.
            LayerConfig::dense(vec![2.0], vec![1.0], Activation::Linear),
        ];
        let stack = RecurrentStack::new(1, &configs).unwrap();
        assert_eq!(stack.n_outputs(), 1);

        // The zero LSTM outputs 0, so the reduction is 2*0 + 1.
        let out = stack.reduce(&arr2(&[[5.0, -3.0]])).unwrap();
        assert!((out[0] - 1.0).abs() < DELTA);
    }

    #[test]
    fn test_masking_flows_into_lstm() {
        let configs = [LayerConfig::masking(), zero_lstm(true)];
        let stack = RecurrentStack::new(1, &configs).unwrap();
        // The zero column is padding; scanning must succeed and keep shape.
        let out = stack.scan(&arr2(&[[1.0, 0.0, 2.0]])).unwrap();
        assert_eq!(out.dim(), (1, 3));
    }

    #[test]
    fn test_embedding_with_passthrough_rows() {
        let embedding = LayerConfig {
            architecture: Architecture::Embedding,
            weights: Vec::new(),
            bias: Vec::new(),
            activation: Activation::Linear,
            inner_activation: Activation::Linear,
            components: HashMap::new(),
            embedding: Some(EmbeddingConfig {
                // Columns: [10, 30], [20, 40].
                weights: vec![10.0, 20.0, 30.0, 40.0],
                bias: Vec::new(),
                index: 0,
                n_outputs: 2,
            }),
            return_sequences: true,
        };
        let stack = RecurrentStack::new(2, &[embedding]).unwrap();

        // Row 0 holds the lookup index, row 1 passes through below the
        // embedding output.
        let out = stack
            .scan(&arr2(&[[0.0, 1.0], [7.0, 8.0]]))
            .unwrap();
        assert_eq!(out, arr2(&[[10.0, 20.0], [30.0, 40.0], [7.0, 8.0]]));
    }

    #[test]
    fn test_embedding_requires_sub_configuration() {
        let config = LayerConfig {
            architecture: Architecture::Embedding,
            weights: Vec::new(),
            bias: Vec::new(),
            activation: Activation::Linear,
            inner_activation: Activation::Linear,
            components: HashMap::new(),
            embedding: None,
            return_sequences: true,
        };
        let result = RecurrentStack::new(1, &[config]);
        assert!(matches!(result, Err(ConfigurationError::MissingEmbedding)));
    }

    #[test]
    fn test_empty_sequence_cannot_be_reduced() {
        let stack = RecurrentStack::new(1, &[zero_lstm(true)]).unwrap();
        let empty = Array2::zeros((1, 0));
        assert!(matches!(
            stack.reduce(&empty),
            Err(EvaluationError::EmptySequence)
        ));
    }

    #[test]
    fn test_recurrent_after_dense_is_rejected() {
        let configs = [
            LayerConfig::dense(vec![1.0], Vec::new(), Activation::Linear),
            zero_lstm(true),
        ];
        let result = RecurrentStack::new(1, &configs);
        assert!(matches!(
            result,
            Err(ConfigurationError::UnexpectedArchitecture { .. })
        ));
    }
}
