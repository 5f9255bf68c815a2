//! Batched gradient accumulation.
//!
//! Every parallel task owns its own propagation scratch and gradient
//! buffers; the per-task buffers are merged pairwise afterwards, so no
//! example's contribution can be lost to a shared accumulator.

use crate::error::NetworkError;
use crate::network::Network;
use crate::propagation::Propagation;
use matrix::Matrix;
use rayon::prelude::*;

/// Cost gradients for every parameter, laid out like the network's layers.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradients {
    pub(crate) weights: Vec<Matrix>,
    pub(crate) biases: Vec<Vec<f64>>,
}

impl Gradients {
    /// Creates zeroed buffers shaped like `network`.
    #[must_use]
    pub fn zeros(network: &Network) -> Self {
        let weights = network
            .layers()
            .iter()
            .map(|layer| Matrix::zeros(layer.weights().rows(), layer.weights().cols()))
            .collect();
        let biases = network
            .layers()
            .iter()
            .map(|layer| vec![0.0; layer.bias().len()])
            .collect();
        Self { weights, biases }
    }

    /// Adds one example's contribution from a finished backward pass.
    ///
    /// The gradient for a weight is the error term of its destination neuron
    /// times the activation of its source neuron; for a bias it is the error
    /// term alone.
    ///
    /// # Errors
    ///
    /// Returns an error if `propagation` or these buffers are not shaped
    /// like `network`.
    pub fn accumulate(
        &mut self,
        network: &Network,
        propagation: &Propagation,
    ) -> Result<(), NetworkError> {
        propagation.check_shape(network)?;
        self.check_shape(network)?;

        for l in 1..network.layers().len() {
            let errors = propagation.error_terms(l);
            let prev_activations = propagation.activations(l - 1);
            let weight_grads = &mut self.weights[l];
            for (i, &a) in prev_activations.iter().enumerate() {
                for (g, &e) in weight_grads.row_mut(i).iter_mut().zip(errors) {
                    *g += a * e;
                }
            }
            for (g, &e) in self.biases[l].iter_mut().zip(errors) {
                *g += e;
            }
        }
        Ok(())
    }

    /// Multiplies every buffered gradient by `factor`.
    pub fn scale(&mut self, factor: f64) {
        for weight_grads in &mut self.weights {
            weight_grads.scale(factor);
        }
        for bias_grads in &mut self.biases {
            for g in bias_grads.iter_mut() {
                *g *= factor;
            }
        }
    }

    /// Returns the weight gradients feeding one layer.
    #[must_use]
    pub fn weights(&self, layer: usize) -> &Matrix {
        &self.weights[layer]
    }

    /// Returns the bias gradients of one layer.
    #[must_use]
    pub fn biases(&self, layer: usize) -> &[f64] {
        &self.biases[layer]
    }

    /// Folds another set of buffers into this one.
    fn merge(mut self, other: Gradients) -> Gradients {
        for (mine, theirs) in self.weights.iter_mut().zip(other.weights.iter()) {
            mine.accumulate(theirs);
        }
        for (mine, theirs) in self.biases.iter_mut().zip(other.biases.iter()) {
            for (a, b) in mine.iter_mut().zip(theirs) {
                *a += b;
            }
        }
        self
    }

    pub(crate) fn check_shape(&self, network: &Network) -> Result<(), NetworkError> {
        if self.weights.len() != network.layers().len() {
            return Err(NetworkError::DimensionMismatch {
                expected: network.layers().len(),
                actual: self.weights.len(),
            });
        }
        for (l, layer) in network.layers().iter().enumerate() {
            if self.weights[l].rows() != layer.weights().rows()
                || self.weights[l].cols() != layer.weights().cols()
                || self.biases[l].len() != layer.bias().len()
            {
                return Err(NetworkError::DimensionMismatch {
                    expected: layer.neurons(),
                    actual: self.biases[l].len(),
                });
            }
        }
        Ok(())
    }
}

/// Computes batch-averaged gradients for up to `batch_size` examples.
///
/// Each example in `examples` pairs an input with its target. The examples
/// are propagated independently on the rayon pool. When fewer than
/// `batch_size` examples are supplied, the remainder of the batch is filled
/// with zero inputs and zero targets and the divisor stays `batch_size`, so
/// a short final batch averages exactly like a full one.
///
/// Returns the averaged gradients together with the summed cost of the real
/// examples.
///
/// # Errors
///
/// Returns an error if more than `batch_size` examples are supplied, if
/// `batch_size` is zero, or if any example's input or target width does not
/// match the network.
pub fn batch_gradients(
    network: &Network,
    examples: &[(&[f64], &[f64])],
    batch_size: usize,
) -> Result<(Gradients, f64), NetworkError> {
    if batch_size == 0 {
        return Err(NetworkError::InvalidArchitecture(
            "batch size must be at least 1".into(),
        ));
    }
    if examples.len() > batch_size {
        return Err(NetworkError::DimensionMismatch {
            expected: batch_size,
            actual: examples.len(),
        });
    }

    let zero_input = vec![0.0; network.input_size()];
    let zero_target = vec![0.0; network.output_size()];

    let (mut gradients, cost) = (0..batch_size)
        .into_par_iter()
        .try_fold(
            || (Propagation::new(network), Gradients::zeros(network), 0.0),
            |(mut propagation, mut gradients, mut cost), index| {
                let (input, target) = match examples.get(index) {
                    Some(&(input, target)) => (input, target),
                    None => (zero_input.as_slice(), zero_target.as_slice()),
                };
                propagation.forward(network, input)?;
                if index < examples.len() {
                    cost += propagation.cost(target)?;
                }
                propagation.backward(network, target)?;
                gradients.accumulate(network, &propagation)?;
                Ok((propagation, gradients, cost))
            },
        )
        .map(|task: Result<_, NetworkError>| task.map(|(_, gradients, cost)| (gradients, cost)))
        .try_reduce(
            || (Gradients::zeros(network), 0.0),
            |(gradients_a, cost_a), (gradients_b, cost_b)| {
                Ok((gradients_a.merge(gradients_b), cost_a + cost_b))
            },
        )?;

    gradients.scale(1.0 / batch_size as f64);
    Ok((gradients, cost))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activations::Activation;
    use crate::layer::Layer;
    use approx::assert_relative_eq;
    use matrix::matrix;

    fn fixed_network() -> Network {
        let layers = vec![
            Layer::input(2),
            Layer::from_parts(2, 2, matrix![0.3, -0.2; 0.1, 0.4], vec![0.05, -0.05])
                .expect("hidden layer should build"),
            Layer::from_parts(1, 2, matrix![0.7; -0.6], vec![0.2]).expect("output layer"),
        ];
        Network::from_parts(layers, Activation::Sigmoid).expect("network should build")
    }

    fn single_example_gradients(network: &Network, input: &[f64], target: &[f64]) -> Gradients {
        let mut propagation = Propagation::new(network);
        propagation.forward(network, input).expect("forward");
        propagation.backward(network, target).expect("backward");
        let mut gradients = Gradients::zeros(network);
        gradients
            .accumulate(network, &propagation)
            .expect("accumulate");
        gradients
    }

    fn assert_gradients_close(a: &Gradients, b: &Gradients) {
        for l in 0..a.weights.len() {
            for (x, y) in a.weights(l).data().iter().zip(b.weights(l).data()) {
                assert_relative_eq!(x, y, epsilon = 1e-12);
            }
            for (x, y) in a.biases(l).iter().zip(b.biases(l)) {
                assert_relative_eq!(x, y, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_batch_of_one_equals_single_example() {
        let network = fixed_network();
        let input = [0.9, -0.4];
        let target = [1.0];

        let expected = single_example_gradients(&network, &input, &target);
        let (batched, _) =
            batch_gradients(&network, &[(&input, &target)], 1).expect("batch should compute");
        assert_eq!(batched, expected);
    }

    #[test]
    fn test_short_batch_pads_with_zero_examples() {
        let network = fixed_network();
        let input = [0.9, -0.4];
        let target = [1.0];
        let zero_input = [0.0, 0.0];
        let zero_target = [0.0];

        let mut expected = single_example_gradients(&network, &input, &target);
        let padding = single_example_gradients(&network, &zero_input, &zero_target);
        expected = expected.merge(padding.clone()).merge(padding);
        expected.scale(1.0 / 3.0);

        let (batched, _) =
            batch_gradients(&network, &[(&input, &target)], 3).expect("batch should compute");
        assert_gradients_close(&batched, &expected);
    }

    #[test]
    fn test_batch_averages_over_fixed_size() {
        let network = fixed_network();
        let examples: Vec<(Vec<f64>, Vec<f64>)> = vec![
            (vec![0.9, -0.4], vec![1.0]),
            (vec![-0.2, 0.6], vec![0.0]),
        ];

        let mut expected = Gradients::zeros(&network);
        for (input, target) in &examples {
            expected = expected.merge(single_example_gradients(&network, input, target));
        }
        expected.scale(0.5);

        let refs: Vec<(&[f64], &[f64])> = examples
            .iter()
            .map(|(input, target)| (input.as_slice(), target.as_slice()))
            .collect();
        let (batched, _) = batch_gradients(&network, &refs, 2).expect("batch should compute");
        assert_gradients_close(&batched, &expected);
    }

    #[test]
    fn test_batch_cost_skips_padding() {
        let network = fixed_network();
        let input = [0.9, -0.4];
        let target = [1.0];

        let mut propagation = Propagation::new(&network);
        propagation.forward(&network, &input).expect("forward");
        let expected_cost = propagation.cost(&target).expect("cost");

        let (_, cost) =
            batch_gradients(&network, &[(&input, &target)], 4).expect("batch should compute");
        assert_relative_eq!(cost, expected_cost, epsilon = 1e-12);
    }

    #[test]
    fn test_batch_rejects_overfull_input() {
        let network = fixed_network();
        let input = [0.9, -0.4];
        let target = [1.0];
        let examples = [(&input[..], &target[..]), (&input[..], &target[..])];
        assert!(matches!(
            batch_gradients(&network, &examples, 1),
            Err(NetworkError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_batch_rejects_zero_batch_size() {
        let network = fixed_network();
        assert!(matches!(
            batch_gradients(&network, &[], 0),
            Err(NetworkError::InvalidArchitecture(_))
        ));
    }

    #[test]
    fn test_batch_surfaces_bad_example_width() {
        let network = fixed_network();
        let bad_input = [0.9];
        let target = [1.0];
        assert!(matches!(
            batch_gradients(&network, &[(&bad_input, &target)], 1),
            Err(NetworkError::DimensionMismatch { .. })
        ));
    }
}
