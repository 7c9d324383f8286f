//! Errors raised when runtime data violates an evaluation contract.

use thiserror::Error;

/// Errors raised during `compute`, `scan` or `reduce` when the supplied data
/// does not match what the constructed model expects. The model structure is
/// not corrupted: a subsequent call with valid input must succeed normally.
#[derive(Error, Debug)]
pub enum EvaluationError {
    #[error("No value provided for input '{name}'")]
    MissingInput { name: String },

    #[error("The source has no input at index {index}, only {available} are available")]
    InputIndexOutOfRange { index: usize, available: usize },

    #[error("The input vector length must match the declared size: {actual} != {expected}")]
    InputSizeMismatch { expected: usize, actual: usize },

    #[error(
        "The input sequence row count must match the declared size: {actual} != {expected}"
    )]
    SequenceSizeMismatch { expected: usize, actual: usize },

    #[error(
        "The sequence for input '{name}' has {actual} timesteps, but {expected} were expected"
    )]
    RaggedSequence {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("An input sequence must contain at least one timestep")]
    EmptySequence,

    #[error("Merged sequences must have the same number of timesteps: {left} != {right}")]
    TimestepCountMismatch { left: usize, right: usize },

    #[error("The mask covers {mask_len} timesteps but the sequence has {timesteps}")]
    MaskLengthMismatch { mask_len: usize, timesteps: usize },

    #[error("The embedding index {index} is not a valid position among {n_vocab} entries")]
    EmbeddingIndexOutOfRange { index: f64, n_vocab: usize },

    #[error("Node {node} does not exist in this graph")]
    NodeNotFound { node: usize },

    #[error("Node {node} does not produce a vector; use scan instead")]
    NotAVectorNode { node: usize },

    #[error("Node {node} does not produce a sequence; use compute instead")]
    NotASequenceNode { node: usize },
}
