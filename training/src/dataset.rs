use crate::error::TrainingError;

/// Borrowed view over a labelled dataset: inputs paired index for index
/// with one-hot targets.
#[derive(Clone, Copy, Debug)]
pub struct Dataset<'a> {
    inputs: &'a [Vec<f64>],
    targets: &'a [Vec<f64>],
}

impl<'a> Dataset<'a> {
    /// Pairs `inputs` with `targets`.
    ///
    /// # Errors
    ///
    /// Returns an error when the slices differ in length or are empty.
    pub fn new(inputs: &'a [Vec<f64>], targets: &'a [Vec<f64>]) -> Result<Self, TrainingError> {
        if inputs.len() != targets.len() {
            return Err(TrainingError::DataMismatch(format!(
                "got {} inputs but {} targets",
                inputs.len(),
                targets.len()
            )));
        }
        if inputs.is_empty() {
            return Err(TrainingError::DataMismatch(
                "a dataset needs at least one example".to_string(),
            ));
        }
        Ok(Self { inputs, targets })
    }

    /// Number of examples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// The input and target of the example at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[must_use]
    pub fn example(&self, index: usize) -> (&'a [f64], &'a [f64]) {
        (&self.inputs[index], &self.targets[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_pairs_examples() {
        let inputs = vec![vec![0.0, 1.0], vec![1.0, 0.0]];
        let targets = vec![vec![1.0, 0.0], vec![0.0, 1.0]];

        let dataset = Dataset::new(&inputs, &targets).expect("dataset should build");
        assert_eq!(dataset.len(), 2);
        assert!(!dataset.is_empty());

        let (input, target) = dataset.example(1);
        assert_eq!(input, &[1.0, 0.0]);
        assert_eq!(target, &[0.0, 1.0]);
    }

    #[test]
    fn test_dataset_rejects_length_mismatch() {
        let inputs = vec![vec![0.0], vec![1.0]];
        let targets = vec![vec![1.0]];

        let result = Dataset::new(&inputs, &targets);
        match result {
            Err(TrainingError::DataMismatch(reason)) => {
                assert!(reason.contains("2 inputs but 1 targets"));
            }
            _ => panic!("Expected DataMismatch error"),
        }
    }

    #[test]
    fn test_dataset_rejects_empty() {
        let inputs: Vec<Vec<f64>> = Vec::new();
        let targets: Vec<Vec<f64>> = Vec::new();

        let result = Dataset::new(&inputs, &targets);
        match result {
            Err(TrainingError::DataMismatch(_)) => {}
            _ => panic!("Expected DataMismatch error"),
        }
    }
}
