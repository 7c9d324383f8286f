//! Data structures describing a model's layers and wiring.
//!
//! These structures are the fully materialized, in-memory form of a
//! serialized model description. An external parser (out of scope for this
//! crate) produces them; the [`crate::Stack`], [`crate::RecurrentStack`] and
//! [`crate::Graph`] constructors consume them. All of them derive serde
//! traits so that callers can deserialize a model straight from JSON.

use crate::activation::Activation;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The kind of layer a [`LayerConfig`] declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Architecture {
    /// Feed-forward layer: affine transform, bias add and activation, each
    /// present when the corresponding config field is non-empty.
    Dense,
    /// Index lookup into an embedding matrix, plus bias.
    Embedding,
    /// Long short-term memory recurrence.
    Lstm,
    /// Gated recurrent unit recurrence.
    Gru,
    /// Padding detection: flags timesteps whose column sums to zero.
    Masking,
}

impl Architecture {
    /// Stable name of the architecture, as used in serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            Architecture::Dense => "DENSE",
            Architecture::Embedding => "EMBEDDING",
            Architecture::Lstm => "LSTM",
            Architecture::Gru => "GRU",
            Architecture::Masking => "MASKING",
        }
    }
}

/// Identifies one gate of a recurrent layer inside the component map.
///
/// LSTM layers use `I` (input), `F` (forget), `O` (output) and `C` (cell
/// candidate); GRU layers use `Z` (update), `R` (reset) and `H` (hidden
/// candidate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Component {
    I,
    F,
    O,
    C,
    Z,
    R,
    H,
}

impl Component {
    /// Stable name of the component, as used in serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            Component::I => "i",
            Component::F => "f",
            Component::O => "o",
            Component::C => "c",
            Component::Z => "z",
            Component::R => "r",
            Component::H => "h",
        }
    }
}

/// Weights of one gate of a recurrent layer.
///
/// `weights` multiplies the current input column, `recurrent_weights`
/// multiplies the previous hidden state, `bias` is added to both. All arrays
/// are flat and row-major.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GateConfig {
    #[serde(default)]
    pub weights: Vec<f64>,
    #[serde(default)]
    pub recurrent_weights: Vec<f64>,
    #[serde(default)]
    pub bias: Vec<f64>,
}

/// Configuration of an embedding lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Flat row-major embedding matrix with `n_outputs` rows; the column
    /// count (vocabulary size) is inferred from the array length.
    pub weights: Vec<f64>,
    /// Bias added to every looked-up column. Empty means no bias.
    #[serde(default)]
    pub bias: Vec<f64>,
    /// Which input row of the sequence holds the lookup index.
    pub index: usize,
    /// Width of one embedded timestep.
    pub n_outputs: usize,
}

/// Declares one layer of a stack.
///
/// For `DENSE` layers, `weights`, `bias` and `activation` each contribute one
/// primitive layer when present. For `LSTM` and `GRU` layers the gate weights
/// live in `components`, `activation` transforms the state, and
/// `inner_activation` transforms the gates. `EMBEDDING` layers carry their
/// parameters in `embedding`; `MASKING` layers need nothing further.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerConfig {
    pub architecture: Architecture,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub weights: Vec<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bias: Vec<f64>,
    #[serde(default = "default_activation")]
    pub activation: Activation,
    #[serde(default = "default_activation")]
    pub inner_activation: Activation,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub components: HashMap<Component, GateConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<EmbeddingConfig>,
    /// Whether a recurrent layer emits the full output sequence or only the
    /// final timestep.
    #[serde(default)]
    pub return_sequences: bool,
}

fn default_activation() -> Activation {
    Activation::Linear
}

impl LayerConfig {
    /// Shorthand for a feed-forward layer configuration.
    pub fn dense(weights: Vec<f64>, bias: Vec<f64>, activation: Activation) -> Self {
        LayerConfig {
            architecture: Architecture::Dense,
            weights,
            bias,
            activation,
            inner_activation: Activation::Linear,
            components: HashMap::new(),
            embedding: None,
            return_sequences: false,
        }
    }

    /// Shorthand for a masking layer configuration.
    pub fn masking() -> Self {
        LayerConfig {
            architecture: Architecture::Masking,
            weights: Vec::new(),
            bias: Vec::new(),
            activation: Activation::Linear,
            inner_activation: Activation::Linear,
            components: HashMap::new(),
            embedding: None,
            return_sequences: true,
        }
    }
}

/// A named scalar feature with its standardization constants.
///
/// The preprocessors turn a raw value into `(raw + offset) * scale`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Input {
    pub name: String,
    pub offset: f64,
    pub scale: f64,
}

/// Declares one node of a computation graph.
///
/// Node ids are positions in the node configuration list. A node may be
/// referenced as a source by any number of downstream nodes, but the source
/// relation must form a DAG: a node may never, even transitively, depend on
/// itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeConfig {
    /// Reads a raw vector from the evaluation-time source.
    #[serde(rename = "INPUT")]
    Input(InputNodeInfo),
    /// Reads a raw sequence from the evaluation-time source.
    #[serde(rename = "INPUT_SEQUENCE")]
    InputSequence(InputNodeInfo),
    /// Applies a feed-forward stack to one upstream vector node.
    #[serde(rename = "FEED_FORWARD")]
    FeedForward(LayeredNodeInfo),
    /// Stacks the outputs of several upstream vector nodes into one vector.
    #[serde(rename = "CONCATENATE")]
    Concatenate(ConcatenateNodeInfo),
    /// Applies a recurrent stack over one upstream sequence node.
    #[serde(rename = "SEQUENCE")]
    Sequence(LayeredNodeInfo),
    /// Applies a feed-forward stack to every timestep of an upstream
    /// sequence node.
    #[serde(rename = "TIME_DISTRIBUTED")]
    TimeDistributed(LayeredNodeInfo),
    /// Sums an upstream sequence node across timesteps.
    #[serde(rename = "SUM")]
    Sum(SumNodeInfo),
}

/// Configuration shared by `INPUT` and `INPUT_SEQUENCE` nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputNodeInfo {
    /// Index of the raw input within the evaluation-time source.
    pub index: usize,
    /// Declared width of the input vector (or sequence rows). This is
    /// asserted against the supplied data at evaluation time, not inferred.
    pub size: usize,
}

/// Configuration shared by nodes wrapping a layer stack.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayeredNodeInfo {
    /// Node id of the upstream node.
    pub source: usize,
    /// Index into the shared layer configuration list.
    pub layer: usize,
}

/// Configuration of a `CONCATENATE` node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConcatenateNodeInfo {
    /// Node ids of the upstream vector nodes, in declaration order.
    pub sources: Vec<usize>,
}

/// Configuration of a `SUM` node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SumNodeInfo {
    /// Node id of the upstream sequence node.
    pub source: usize,
}

impl NodeConfig {
    /// Returns the node ids this node depends on.
    ///
    /// Input nodes read from the evaluation-time source rather than from
    /// other nodes, so they report no dependencies.
    pub fn sources(&self) -> Vec<usize> {
        match self {
            NodeConfig::Input(_) | NodeConfig::InputSequence(_) => Vec::new(),
            NodeConfig::FeedForward(info) => vec![info.source],
            NodeConfig::Concatenate(info) => info.sources.clone(),
            NodeConfig::Sequence(info) => vec![info.source],
            NodeConfig::TimeDistributed(info) => vec![info.source],
            NodeConfig::Sum(info) => vec![info.source],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sources_of_each_node_kind() {
        let input = NodeConfig::Input(InputNodeInfo { index: 0, size: 3 });
        assert!(input.sources().is_empty());

        let ff = NodeConfig::FeedForward(LayeredNodeInfo { source: 0, layer: 1 });
        assert_eq!(ff.sources(), vec![0]);

        let cat = NodeConfig::Concatenate(ConcatenateNodeInfo {
            sources: vec![2, 0, 1],
        });
        assert_eq!(cat.sources(), vec![2, 0, 1]);

        let sum = NodeConfig::Sum(SumNodeInfo { source: 4 });
        assert_eq!(sum.sources(), vec![4]);
    }

    #[test]
    fn test_layer_config_dense_shorthand() {
        let cfg = LayerConfig::dense(vec![1.0, 2.0], vec![0.5], Activation::Rectified);
        assert_eq!(cfg.architecture, Architecture::Dense);
        assert_eq!(cfg.activation, Activation::Rectified);
        assert!(!cfg.return_sequences);
    }
}
