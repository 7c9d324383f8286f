//! Error types for graph construction and evaluation.
//!
//! This module contains specific error types used throughout the library,
//! avoiding generic error wrappers like `anyhow` or `Box<dyn Error>` for
//! better error handling and debugging. Two kinds exist: configuration
//! errors, raised while building a model from its declared description, and
//! evaluation errors, raised when runtime-supplied data violates an input
//! contract. A configuration error means the model itself is invalid; an
//! evaluation error leaves the model intact for subsequent calls.

mod configuration_error;
mod evaluation_error;

pub use configuration_error::ConfigurationError;
pub use evaluation_error::EvaluationError;

/// Result type alias for model construction operations.
pub type ConfigurationResult<T> = std::result::Result<T, ConfigurationError>;

/// Result type alias for evaluation operations.
pub type EvaluationResult<T> = std::result::Result<T, EvaluationError>;
