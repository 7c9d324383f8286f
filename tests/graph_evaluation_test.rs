//! Tests for graph wiring and evaluation, including JSON-loaded configs.

use lightnn_inference::model_config::{
    ConcatenateNodeInfo, InputNodeInfo, LayeredNodeInfo, SumNodeInfo,
};
use lightnn_inference::{
    Activation, Graph, Input, InputPreprocessor, LayerConfig, NodeConfig, VectorSource,
};
use ndarray::{arr1, arr2};
use serde::Deserialize;
use std::collections::HashMap;

const DELTA: f64 = 1e-9;

const JSON_MODEL_CONFIG: &str = r#"
{
  "inputs": [
    { "name": "pt", "offset": 0.0, "scale": 1.0 },
    { "name": "eta", "offset": 1.0, "scale": 0.5 }
  ],
  "layers": [
    {
      "architecture": "DENSE",
      "weights": [1.0, 1.0, 1.0, -1.0],
      "bias": [0.0, 0.0],
      "activation": "RECTIFIED"
    },
    {
      "architecture": "DENSE",
      "activation": "SOFTMAX"
    }
  ],
  "nodes": [
    { "type": "INPUT", "index": 0, "size": 2 },
    { "type": "FEED_FORWARD", "source": 0, "layer": 0 },
    { "type": "FEED_FORWARD", "source": 1, "layer": 1 }
  ]
}
"#;

/// The on-disk shape of a serialized model, as an external loader would
/// produce it.
#[derive(Deserialize)]
struct ModelDescription {
    inputs: Vec<Input>,
    layers: Vec<LayerConfig>,
    nodes: Vec<NodeConfig>,
}

#[test]
fn test_json_loaded_model_evaluates() {
    let description: ModelDescription = serde_json::from_str(JSON_MODEL_CONFIG).unwrap();
    assert_eq!(description.nodes.len(), 3);

    let preprocessor = InputPreprocessor::new(&description.inputs).unwrap();
    let graph = Graph::new(&description.nodes, &description.layers).unwrap();

    let mut raw = HashMap::new();
    raw.insert("pt".to_string(), 2.0);
    raw.insert("eta".to_string(), 3.0);
    let standardized = preprocessor.transform(&raw).unwrap();
    // (2 + 0) * 1 and (3 + 1) * 0.5.
    assert_eq!(standardized, arr1(&[2.0, 2.0]));

    let source = VectorSource::new(vec![standardized], Vec::new());
    let out = graph.compute(&source).unwrap();

    // Hidden layer: ReLU([x0 + x1, x0 - x1]) = [4, 0], then softmax.
    let expected_hot = 4.0_f64.exp() / (4.0_f64.exp() + 1.0);
    assert!((out[0] - expected_hot).abs() < DELTA);
    assert!((out[1] - (1.0 - expected_hot)).abs() < DELTA);
    assert!((out.sum() - 1.0).abs() < DELTA);
}

#[test]
fn test_node_config_serde_round_trip() {
    let description: ModelDescription = serde_json::from_str(JSON_MODEL_CONFIG).unwrap();
    let serialized = serde_json::to_value(&description.nodes).unwrap();
    assert_eq!(serialized[0]["type"], "INPUT");
    assert_eq!(serialized[1]["type"], "FEED_FORWARD");
    assert_eq!(serialized[1]["source"], 0);

    let reparsed: Vec<NodeConfig> = serde_json::from_value(serialized).unwrap();
    let graph = Graph::new(&reparsed, &description.layers).unwrap();
    let source = VectorSource::new(vec![arr1(&[1.0, 0.0])], Vec::new());
    assert!(graph.compute(&source).is_ok());
}

#[test]
fn test_diamond_dag_with_shared_input() {
    // One input feeds two different transforms whose outputs are
    // concatenated: a diamond, not a tree.
    let layers = [
        LayerConfig::dense(vec![2.0], Vec::new(), Activation::Linear),
        LayerConfig::dense(vec![-1.0], vec![10.0], Activation::Linear),
    ];
    let nodes = [
        NodeConfig::Input(InputNodeInfo { index: 0, size: 1 }),
        NodeConfig::FeedForward(LayeredNodeInfo { source: 0, layer: 0 }),
        NodeConfig::FeedForward(LayeredNodeInfo { source: 0, layer: 1 }),
        NodeConfig::Concatenate(ConcatenateNodeInfo {
            sources: vec![1, 2],
        }),
    ];
    let graph = Graph::new(&nodes, &layers).unwrap();

    let source = VectorSource::new(vec![arr1(&[3.0])], Vec::new());
    assert_eq!(graph.compute(&source).unwrap(), arr1(&[6.0, 7.0]));
}

#[test]
fn test_time_distributed_into_sum() {
    // Per-timestep affine, then a sum across timesteps: equivalent to the
    // affine applied to the column sum, which pins down both nodes.
    let layers = [LayerConfig::dense(
        vec![1.0, 1.0],
        Vec::new(),
        Activation::Linear,
    )];
    let nodes = [
        NodeConfig::InputSequence(InputNodeInfo { index: 0, size: 2 }),
        NodeConfig::TimeDistributed(LayeredNodeInfo { source: 0, layer: 0 }),
        NodeConfig::Sum(SumNodeInfo { source: 1 }),
    ];
    let graph = Graph::new(&nodes, &layers).unwrap();

    let source = VectorSource::new(
        Vec::new(),
        vec![arr2(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]])],
    );
    assert_eq!(graph.compute(&source).unwrap(), arr1(&[21.0]));
}

#[test]
fn test_graph_survives_an_evaluation_error() {
    let nodes = [NodeConfig::Input(InputNodeInfo { index: 0, size: 2 })];
    let graph = Graph::new(&nodes, &[]).unwrap();

    // Wrong vector length fails without corrupting the graph.
    let bad = VectorSource::new(vec![arr1(&[1.0])], Vec::new());
    assert!(graph.compute(&bad).is_err());

    let good = VectorSource::new(vec![arr1(&[1.0, 2.0])], Vec::new());
    assert_eq!(graph.compute(&good).unwrap(), arr1(&[1.0, 2.0]));
}

#[test]
fn test_missing_named_input_is_reported_by_name() {
    let inputs = [Input {
        name: "pt".to_string(),
        offset: 0.0,
        scale: 1.0,
    }];
    let preprocessor = InputPreprocessor::new(&inputs).unwrap();
    let err = preprocessor.transform(&HashMap::new()).unwrap_err();
    assert!(err.to_string().contains("pt"));
}
