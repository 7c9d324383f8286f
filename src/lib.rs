//! Lightweight forward-pass evaluation of trained neural networks.
//!
//! This library evaluates pre-trained feed-forward and recurrent networks at
//! inference time from a declarative, in-memory description of layers and
//! wiring. It performs no training and no gradient computation; the goal is a
//! fast, dependency-light forward pass for applications (tagging and
//! classification pipelines, for example) that cannot afford a full training
//! framework at runtime.
//!
//! The entry point is [`Graph`], built once from a list of [`NodeConfig`] and
//! a shared list of [`LayerConfig`], then evaluated repeatedly against a
//! [`Source`] of raw input vectors and sequences. Simpler models can use
//! [`Stack`] (feed-forward) or [`RecurrentStack`] (sequence reduction)
//! directly.

pub mod activation;
pub mod errors;
pub mod graph;
pub mod layers;
pub mod model_config;
pub mod preprocessor;
pub mod recurrent;
pub mod recurrent_stack;
pub mod source;
pub mod stack;
pub(crate) mod utils;

pub use activation::Activation;
pub use graph::Graph;
pub use model_config::{
    Architecture, Component, EmbeddingConfig, GateConfig, Input, LayerConfig, NodeConfig,
};
pub use preprocessor::{InputPreprocessor, InputVectorPreprocessor};
pub use recurrent_stack::RecurrentStack;
pub use source::{Source, VectorSource};
pub use stack::Stack;
