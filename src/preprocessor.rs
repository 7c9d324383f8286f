//! Standardization of named raw inputs into model-space arrays.

use crate::errors::{
    ConfigurationError, ConfigurationResult, EvaluationError, EvaluationResult,
};
use crate::model_config::Input;
use ndarray::{Array1, Array2};
use std::collections::HashMap;

/// Turns a map of named raw scalars into a standardized input vector.
///
/// Each configured input contributes one element, in configuration order,
/// computed as `(raw + offset) * scale`. Extra names in the supplied map are
/// ignored; a missing name is an evaluation error.
pub struct InputPreprocessor {
    names: Vec<String>,
    offsets: Array1<f64>,
    scales: Array1<f64>,
}

impl InputPreprocessor {
    pub fn new(inputs: &[Input]) -> ConfigurationResult<Self> {
        if inputs.is_empty() {
            return Err(ConfigurationError::NoInputs);
        }
        Ok(Self {
            names: inputs.iter().map(|input| input.name.clone()).collect(),
            offsets: inputs.iter().map(|input| input.offset).collect(),
            scales: inputs.iter().map(|input| input.scale).collect(),
        })
    }

    pub fn transform(&self, raw: &HashMap<String, f64>) -> EvaluationResult<Array1<f64>> {
        let mut values = Array1::zeros(self.names.len());
        for (position, name) in self.names.iter().enumerate() {
            let value = raw
                .get(name)
                .ok_or_else(|| EvaluationError::MissingInput { name: name.clone() })?;
            values[position] = (value + self.offsets[position]) * self.scales[position];
        }
        Ok(values)
    }

    /// Width of the produced vector.
    pub fn n_outputs(&self) -> usize {
        self.names.len()
    }
}

/// Turns a map of named raw sequences into a standardized input sequence.
///
/// Each configured input contributes one row; columns are timesteps. Every
/// supplied sequence must have the same length, taken from the first
/// configured input.
pub struct InputVectorPreprocessor {
    inputs: Vec<Input>,
}

impl InputVectorPreprocessor {
    pub fn new(inputs: &[Input]) -> ConfigurationResult<Self> {
        if inputs.is_empty() {
            return Err(ConfigurationError::NoInputs);
        }
        Ok(Self {
            inputs: inputs.to_vec(),
        })
    }

    pub fn transform(&self, raw: &HashMap<String, Vec<f64>>) -> EvaluationResult<Array2<f64>> {
        let first = &self.inputs[0].name;
        let timesteps = raw
            .get(first)
            .ok_or_else(|| EvaluationError::MissingInput {
                name: first.clone(),
            })?
            .len();

        let mut values = Array2::zeros((self.inputs.len(), timesteps));
        for (row, input) in self.inputs.iter().enumerate() {
            let sequence =
                raw.get(&input.name)
                    .ok_or_else(|| EvaluationError::MissingInput {
                        name: input.name.clone(),
                    })?;
            if sequence.len() != timesteps {
                return Err(EvaluationError::RaggedSequence {
                    name: input.name.clone(),
                    expected: timesteps,
                    actual: sequence.len(),
                });
            }
            for (column, value) in sequence.iter().enumerate() {
                values[[row, column]] = (value + input.offset) * input.scale;
            }
        }
        Ok(values)
    }

    /// Number of rows of the produced sequence.
    pub fn n_outputs(&self) -> usize {
        self.inputs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2};

    const DELTA: f64 = 1e-9;

    fn two_inputs() -> Vec<Input> {
        vec![
            Input {
                name: "pt".to_string(),
                offset: -1.0,
                scale: 0.5,
            },
            Input {
                name: "eta".to_string(),
                offset: 0.0,
                scale: 2.0,
            },
        ]
    }

    #[test]
    fn test_vector_standardization_in_configured_order() {
        let preprocessor = InputPreprocessor::new(&two_inputs()).unwrap();
        let mut raw = HashMap::new();
        raw.insert("eta".to_string(), 3.0);
        raw.insert("pt".to_string(), 5.0);
        raw.insert("ignored".to_string(), 99.0);

        let out = preprocessor.transform(&raw).unwrap();
        assert_eq!(preprocessor.n_outputs(), 2);
        assert!((out[0] - 2.0).abs() < DELTA); // (5 - 1) * 0.5
        assert!((out[1] - 6.0).abs() < DELTA); // (3 + 0) * 2
        assert_eq!(out, arr1(&[2.0, 6.0]));
    }

    #[test]
    fn test_missing_name_is_reported() {
        let preprocessor = InputPreprocessor::new(&two_inputs()).unwrap();
        let mut raw = HashMap::new();
        raw.insert("pt".to_string(), 5.0);
        let result = preprocessor.transform(&raw);
        assert!(matches!(
            result,
            Err(EvaluationError::MissingInput { ref name }) if name == "eta"
        ));
    }

    #[test]
    fn test_no_inputs_rejected_at_construction() {
        assert!(matches!(
            InputPreprocessor::new(&[]),
            Err(ConfigurationError::NoInputs)
        ));
        assert!(matches!(
            InputVectorPreprocessor::new(&[]),
            Err(ConfigurationError::NoInputs)
        ));
    }

    #[test]
    fn test_sequence_standardization_rows_are_inputs() {
        let preprocessor = InputVectorPreprocessor::new(&two_inputs()).unwrap();
        let mut raw = HashMap::new();
        raw.insert("pt".to_string(), vec![1.0, 3.0]);
        raw.insert("eta".to_string(), vec![0.5, -0.5]);

        let out = preprocessor.transform(&raw).unwrap();
        assert_eq!(out, arr2(&[[0.0, 1.0], [1.0, -1.0]]));
    }

    #[test]
    fn test_ragged_sequences_are_rejected() {
        let preprocessor = InputVectorPreprocessor::new(&two_inputs()).unwrap();
        let mut raw = HashMap::new();
        raw.insert("pt".to_string(), vec![1.0, 3.0]);
        raw.insert("eta".to_string(), vec![0.5]);

        let result = preprocessor.transform(&raw);
        assert!(matches!(
            result,
            Err(EvaluationError::RaggedSequence {
                ref name,
                expected: 2,
                actual: 1
            }) if name == "eta"
        ));
    }

    #[test]
    fn test_empty_sequences_produce_zero_timesteps() {
        let preprocessor = InputVectorPreprocessor::new(&two_inputs()).unwrap();
        let mut raw = HashMap::new();
        raw.insert("pt".to_string(), Vec::new());
        raw.insert("eta".to_string(), Vec::new());

        let out = preprocessor.transform(&raw).unwrap();
        assert_eq!(out.dim(), (2, 0));
    }
}
