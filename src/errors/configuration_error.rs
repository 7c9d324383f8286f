//! Errors raised while building a model from its declared configuration.

use thiserror::Error;

/// Errors that indicate the declared model description is structurally
/// invalid. Construction aborts entirely; no partially built stack or graph
/// is usable after one of these is raised.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error(
        "The number of weights {n_weights} is not a multiple of the input width {n_inputs}"
    )]
    InvalidWeightCount { n_weights: usize, n_inputs: usize },

    #[error("A weight matrix must have at least one row and one column")]
    EmptyWeights,

    #[error("The bias size must match the layer output width: {bias_size} != {width}")]
    BiasSizeMismatch { bias_size: usize, width: usize },

    #[error("The architecture {architecture} is not valid at this position")]
    UnexpectedArchitecture { architecture: String },

    #[error("The {component} component required by a {architecture} layer is missing")]
    MissingComponent {
        architecture: String,
        component: String,
    },

    #[error(
        "The {component} component output width must match the other gates: {actual} != {expected}"
    )]
    ComponentSizeMismatch {
        component: String,
        expected: usize,
        actual: usize,
    },

    #[error(
        "The {component} recurrent weights must form a {width}x{width} matrix, got {n_weights} coefficients"
    )]
    RecurrentWeightsNotSquare {
        component: String,
        width: usize,
        n_weights: usize,
    },

    #[error("An embedding layer requires an embedding sub-configuration")]
    MissingEmbedding,

    #[error(
        "The embedding input row {index} must be within the sequence width {n_inputs}"
    )]
    EmbeddingRowOutOfRange { index: usize, n_inputs: usize },

    #[error("At least one node is required to build a graph")]
    EmptyGraph,

    #[error("At least one input is required to build a preprocessor")]
    NoInputs,

    #[error("Node {node} requires at least one source")]
    NoSources { node: usize },

    #[error("Node {node} references undeclared source node {source_node}")]
    SourceOutOfRange { node: usize, source_node: usize },

    #[error("Node {node} references layer {layer}, but only {n_layers} layers are declared")]
    LayerOutOfRange {
        node: usize,
        layer: usize,
        n_layers: usize,
    },

    // The field is deliberately not named `source`: thiserror reserves that
    // name for the error-chain source and requires it to be an error type.
    #[error("Node {node} requires source node {source_node} to produce a vector")]
    VectorSourceExpected { node: usize, source_node: usize },

    #[error("Node {node} requires source node {source_node} to produce a sequence")]
    SequenceSourceExpected { node: usize, source_node: usize },

    #[error("Node {node} (transitively) depends on itself")]
    CycleDetected { node: usize },
}
