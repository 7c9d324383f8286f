//! Acyclic computation graph over stacks and recurrent stacks.
//!
//! A [`Graph`] is built once from a node configuration list and a shared
//! layer configuration list, validating the wiring eagerly: every referenced
//! node id must resolve, layer indices must be in range, sources must have
//! the right shape (vector vs sequence) and the dependency relation must be
//! acyclic. After construction the graph is immutable; evaluation borrows a
//! [`Source`] per call and recomputes values fresh each time.

use crate::errors::{
    ConfigurationError, ConfigurationResult, EvaluationError, EvaluationResult,
};
use crate::model_config::{Architecture, LayerConfig, NodeConfig};
use crate::recurrent_stack::RecurrentStack;
use crate::source::Source;
use crate::stack::Stack;
use log::debug;
use ndarray::{Array1, Array2, Axis};
use std::collections::{HashMap, HashSet};

/// A vector-producing node. Layer parameters live in the graph's stack
/// arenas, keyed by the node's own id; the node itself only stores wiring.
enum Node {
    Input { index: usize, n_outputs: usize },
    FeedForward { source: usize },
    Concatenate { sources: Vec<usize>, n_outputs: usize },
    Sequence { source: usize },
    Sum { source: usize },
}

/// A sequence-producing node. `SEQUENCE` nodes appear in both hierarchies:
/// they yield a sequence under `scan` and a reduced vector under `compute`.
enum SequenceNode {
    InputSequence { index: usize, n_outputs: usize },
    Sequence { source: usize },
    TimeDistributed { source: usize },
}

/// The computation graph: all nodes and the stacks they wrap, keyed by node
/// id, plus the designated default output node (the last one declared).
pub struct Graph {
    nodes: HashMap<usize, Node>,
    seq_nodes: HashMap<usize, SequenceNode>,
    stacks: HashMap<usize, Stack>,
    recurrent_stacks: HashMap<usize, RecurrentStack>,
    last_node: usize,
}

impl Graph {
    /// Builds every node of the graph, depth first.
    ///
    /// Node ids are positions in `node_configs`; layered nodes index into the
    /// shared `layer_configs` list. All wiring problems are reported here as
    /// configuration errors and nothing is returned in that case.
    pub fn new(
        node_configs: &[NodeConfig],
        layer_configs: &[LayerConfig],
    ) -> ConfigurationResult<Self> {
        if node_configs.is_empty() {
            return Err(ConfigurationError::EmptyGraph);
        }
        let mut graph = Self {
            nodes: HashMap::new(),
            seq_nodes: HashMap::new(),
            stacks: HashMap::new(),
            recurrent_stacks: HashMap::new(),
            last_node: node_configs.len() - 1,
        };
        let mut cycle_check = HashSet::new();
        for id in 0..node_configs.len() {
            graph.build_node(id, node_configs, layer_configs, &mut cycle_check)?;
        }
        debug!(
            "built graph: {} nodes, default output {}",
            node_configs.len(),
            graph.last_node
        );
        Ok(graph)
    }

    /// Resolves and registers node `id`, building its sources first.
    ///
    /// `cycle_check` holds the ids on the current construction path;
    /// re-entering one of them means the configuration is cyclic.
    fn build_node(
        &mut self,
        id: usize,
        node_configs: &[NodeConfig],
        layer_configs: &[LayerConfig],
        cycle_check: &mut HashSet<usize>,
    ) -> ConfigurationResult<()> {
        if self.nodes.contains_key(&id) || self.seq_nodes.contains_key(&id) {
            return Ok(());
        }
        if !cycle_check.insert(id) {
            return Err(ConfigurationError::CycleDetected { node: id });
        }

        let config = &node_configs[id];
        for source in config.sources() {
            if source >= node_configs.len() {
                return Err(ConfigurationError::SourceOutOfRange {
                    node: id,
                    source_node: source,
                });
            }
            self.build_node(source, node_configs, layer_configs, cycle_check)?;
        }

        match config {
            NodeConfig::Input(info) => {
                self.nodes.insert(
                    id,
                    Node::Input {
                        index: info.index,
                        n_outputs: info.size,
                    },
                );
            }
            NodeConfig::InputSequence(info) => {
                self.seq_nodes.insert(
                    id,
                    SequenceNode::InputSequence {
                        index: info.index,
                        n_outputs: info.size,
                    },
                );
            }
            NodeConfig::FeedForward(info) => {
                let width = self.vector_width(info.source).ok_or(
                    ConfigurationError::VectorSourceExpected {
                        node: id,
                        source_node: info.source,
                    },
                )?;
                let layer = Self::layer(layer_configs, id, info.layer)?;
                let stack = Stack::new(width, std::slice::from_ref(layer))?;
                self.stacks.insert(id, stack);
                self.nodes.insert(id, Node::FeedForward { source: info.source });
            }
            NodeConfig::Concatenate(info) => {
                if info.sources.is_empty() {
                    return Err(ConfigurationError::NoSources { node: id });
                }
                let mut n_outputs = 0;
                for &source in &info.sources {
                    n_outputs += self.vector_width(source).ok_or(
                        ConfigurationError::VectorSourceExpected {
                            node: id,
                            source_node: source,
                        },
                    )?;
                }
                self.nodes.insert(
                    id,
                    Node::Concatenate {
                        sources: info.sources.clone(),
                        n_outputs,
                    },
                );
            }
            NodeConfig::Sequence(info) => {
                let width = self.sequence_width(info.source).ok_or(
                    ConfigurationError::SequenceSourceExpected {
                        node: id,
                        source_node: info.source,
                    },
                )?;
                let layer = Self::layer(layer_configs, id, info.layer)?;
                // A dense config would leave scan untouched while the node
                // declares the dense output width; per-timestep transforms
                // belong to TIME_DISTRIBUTED nodes.
                if layer.architecture == Architecture::Dense {
                    return Err(ConfigurationError::UnexpectedArchitecture {
                        architecture: layer.architecture.as_str().to_string(),
                    });
                }
                let stack = RecurrentStack::new(width, std::slice::from_ref(layer))?;
                self.recurrent_stacks.insert(id, stack);
                // A sequence node answers both compute and scan.
                self.nodes.insert(id, Node::Sequence { source: info.source });
                self.seq_nodes
                    .insert(id, SequenceNode::Sequence { source: info.source });
            }
            NodeConfig::TimeDistributed(info) => {
                let width = self.sequence_width(info.source).ok_or(
                    ConfigurationError::SequenceSourceExpected {
                        node: id,
                        source_node: info.source,
                    },
                )?;
                let layer = Self::layer(layer_configs, id, info.layer)?;
                let stack = Stack::new(width, std::slice::from_ref(layer))?;
                self.stacks.insert(id, stack);
                self.seq_nodes
                    .insert(id, SequenceNode::TimeDistributed { source: info.source });
            }
            NodeConfig::Sum(info) => {
                self.sequence_width(info.source).ok_or(
                    ConfigurationError::SequenceSourceExpected {
                        node: id,
                        source_node: info.source,
                    },
                )?;
                self.nodes.insert(id, Node::Sum { source: info.source });
            }
        }

        cycle_check.remove(&id);
        debug!("built node {}", id);
        Ok(())
    }

    fn layer<'a>(
        layer_configs: &'a [LayerConfig],
        node: usize,
        layer: usize,
    ) -> ConfigurationResult<&'a LayerConfig> {
        layer_configs
            .get(layer)
            .ok_or(ConfigurationError::LayerOutOfRange {
                node,
                layer,
                n_layers: layer_configs.len(),
            })
    }

    /// Output width of a vector-producing node, if `id` is one.
    fn vector_width(&self, id: usize) -> Option<usize> {
        match self.nodes.get(&id)? {
            Node::Input { n_outputs, .. } => Some(*n_outputs),
            Node::FeedForward { .. } => self.stacks.get(&id).map(Stack::n_outputs),
            Node::Concatenate { n_outputs, .. } => Some(*n_outputs),
            Node::Sequence { .. } => self
                .recurrent_stacks
                .get(&id)
                .map(RecurrentStack::n_outputs),
            Node::Sum { source } => self.sequence_width(*source),
        }
    }

    /// Row count of a sequence-producing node, if `id` is one.
    fn sequence_width(&self, id: usize) -> Option<usize> {
        match self.seq_nodes.get(&id)? {
            SequenceNode::InputSequence { n_outputs, .. } => Some(*n_outputs),
            SequenceNode::Sequence { .. } => self
                .recurrent_stacks
                .get(&id)
                .map(RecurrentStack::n_outputs),
            SequenceNode::TimeDistributed { .. } => self.stacks.get(&id).map(Stack::n_outputs),
        }
    }

    /// Evaluates the default output node as a vector.
    pub fn compute(&self, source: &dyn Source) -> EvaluationResult<Array1<f64>> {
        self.compute_node(source, self.last_node)
    }

    /// Evaluates the default output node as a sequence.
    pub fn scan(&self, source: &dyn Source) -> EvaluationResult<Array2<f64>> {
        self.scan_node(source, self.last_node)
    }

    /// Evaluates one vector-producing node, resolving its dependencies
    /// recursively. Values are not cached between calls.
    pub fn compute_node(
        &self,
        source: &dyn Source,
        id: usize,
    ) -> EvaluationResult<Array1<f64>> {
        let node = self.nodes.get(&id).ok_or_else(|| {
            if self.seq_nodes.contains_key(&id) {
                EvaluationError::NotAVectorNode { node: id }
            } else {
                EvaluationError::NodeNotFound { node: id }
            }
        })?;

        match node {
            Node::Input { index, n_outputs } => {
                let vector = source.at(*index)?;
                if vector.len() != *n_outputs {
                    return Err(EvaluationError::InputSizeMismatch {
                        expected: *n_outputs,
                        actual: vector.len(),
                    });
                }
                Ok(vector.clone())
            }
            Node::FeedForward { source: upstream } => {
                let input = self.compute_node(source, *upstream)?;
                let stack = self
                    .stacks
                    .get(&id)
                    .ok_or(EvaluationError::NodeNotFound { node: id })?;
                Ok(stack.compute(&input))
            }
            Node::Concatenate { sources, .. } => {
                let mut parts = Vec::with_capacity(sources.len());
                for &upstream in sources {
                    parts.push(self.compute_node(source, upstream)?);
                }
                Ok(parts.into_iter().flatten().collect())
            }
            Node::Sequence { source: upstream } => {
                let input = self.scan_node(source, *upstream)?;
                let stack = self
                    .recurrent_stacks
                    .get(&id)
                    .ok_or(EvaluationError::NodeNotFound { node: id })?;
                stack.reduce(&input)
            }
            Node::Sum { source: upstream } => {
                let sequence = self.scan_node(source, *upstream)?;
                // Zero timesteps sum to a zero vector.
                Ok(sequence.sum_axis(Axis(1)))
            }
        }
    }

    /// Evaluates one sequence-producing node, resolving its dependencies
    /// recursively. Values are not cached between calls.
    pub fn scan_node(&self, source: &dyn Source, id: usize) -> EvaluationResult<Array2<f64>> {
        let node = self.seq_nodes.get(&id).ok_or_else(|| {
            if self.nodes.contains_key(&id) {
                EvaluationError::NotASequenceNode { node: id }
            } else {
                EvaluationError::NodeNotFound { node: id }
            }
        })?;

        match node {
            SequenceNode::InputSequence { index, n_outputs } => {
                let sequence = source.matrix_at(*index)?;
                if sequence.nrows() != *n_outputs {
                    return Err(EvaluationError::SequenceSizeMismatch {
                        expected: *n_outputs,
                        actual: sequence.nrows(),
                    });
                }
                Ok(sequence.clone())
            }
            SequenceNode::Sequence { source: upstream } => {
                let input = self.scan_node(source, *upstream)?;
                let stack = self
                    .recurrent_stacks
                    .get(&id)
                    .ok_or(EvaluationError::NodeNotFound { node: id })?;
                stack.scan(&input)
            }
            SequenceNode::TimeDistributed { source: upstream } => {
                let input = self.scan_node(source, *upstream)?;
                let stack = self
                    .stacks
                    .get(&id)
                    .ok_or(EvaluationError::NodeNotFound { node: id })?;
                let mut output = Array2::zeros((stack.n_outputs(), input.ncols()));
                for (time, column) in input.axis_iter(Axis(1)).enumerate() {
                    output
                        .column_mut(time)
                        .assign(&stack.compute(&column.to_owned()));
                }
                Ok(output)
            }
        }
    }
}
