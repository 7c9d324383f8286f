//! Evaluation-time supply of raw inputs for graph evaluation.

use crate::errors::{EvaluationError, EvaluationResult};
use ndarray::{Array1, Array2};

/// Supplies raw input data to a graph's input nodes by position.
///
/// A graph never owns its inputs; every evaluation call borrows them from a
/// source. Indices correspond to the `index` fields of the graph's input node
/// configurations.
pub trait Source {
    /// The raw vector for the input node with the given index.
    fn at(&self, index: usize) -> EvaluationResult<&Array1<f64>>;

    /// The raw sequence for the input-sequence node with the given index.
    fn matrix_at(&self, index: usize) -> EvaluationResult<&Array2<f64>>;
}

/// A [`Source`] backed by plain vectors of preprocessed arrays.
///
/// Vectors and sequences are indexed independently, mirroring the separate
/// numbering of `INPUT` and `INPUT_SEQUENCE` nodes.
pub struct VectorSource {
    vectors: Vec<Array1<f64>>,
    matrices: Vec<Array2<f64>>,
}

impl VectorSource {
    pub fn new(vectors: Vec<Array1<f64>>, matrices: Vec<Array2<f64>>) -> Self {
        Self { vectors, matrices }
    }
}

impl Source for VectorSource {
    fn at(&self, index: usize) -> EvaluationResult<&Array1<f64>> {
        self.vectors
            .get(index)
            .ok_or(EvaluationError::InputIndexOutOfRange {
                index,
                available: self.vectors.len(),
            })
    }

    fn matrix_at(&self, index: usize) -> EvaluationResult<&Array2<f64>> {
        self.matrices
            .get(index)
            .ok_or(EvaluationError::InputIndexOutOfRange {
                index,
                available: self.matrices.len(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2};

    #[test]
    fn test_lookup_by_position() {
        let source = VectorSource::new(
            vec![arr1(&[1.0]), arr1(&[2.0, 3.0])],
            vec![arr2(&[[4.0, 5.0]])],
        );
        assert_eq!(source.at(1).unwrap(), &arr1(&[2.0, 3.0]));
        assert_eq!(source.matrix_at(0).unwrap(), &arr2(&[[4.0, 5.0]]));
    }

    #[test]
    fn test_out_of_range_reports_available_count() {
        let source = VectorSource::new(vec![arr1(&[1.0])], Vec::new());
        assert!(matches!(
            source.at(1),
            Err(EvaluationError::InputIndexOutOfRange {
                index: 1,
                available: 1
            })
        ));
        assert!(matches!(
            source.matrix_at(0),
            Err(EvaluationError::InputIndexOutOfRange {
                index: 0,
                available: 0
            })
        ));
    }
}
