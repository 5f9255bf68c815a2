//! Forward and backward passes over a network.
//!
//! The scratch buffers for one pass live here rather than in the network
//! itself, so parameters stay shared and read-only while each caller, or
//! each parallel task, walks its own activations and error terms.

use crate::error::NetworkError;
use crate::network::Network;

/// Scratch state for propagating one example through a network.
///
/// Holds one activation vector and one error-term vector per layer. The
/// buffers are reused across calls, so a long training loop allocates once.
#[derive(Debug, Clone)]
pub struct Propagation {
    pub(crate) activations: Vec<Vec<f64>>,
    pub(crate) error_terms: Vec<Vec<f64>>,
}

impl Propagation {
    /// Creates scratch buffers sized for `network`.
    #[must_use]
    pub fn new(network: &Network) -> Self {
        let mut propagation = Self {
            activations: Vec::new(),
            error_terms: Vec::new(),
        };
        propagation.ensure_shape(network);
        propagation
    }

    /// Runs `input` forward through the network and returns the output
    /// layer's activations.
    ///
    /// Every neuron computes its weighted sum over the previous layer's
    /// activations plus its bias, then applies the network's activation
    /// function. Parameters are read, never written.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::DimensionMismatch`] if `input` is not exactly
    /// as wide as the input layer.
    ///
    /// # Examples
    ///
    /// ```
    /// use neural_network::{Activation, Network, Propagation};
    /// use rand::rngs::StdRng;
    /// use rand::SeedableRng;
    ///
    /// let mut rng = StdRng::seed_from_u64(1);
    /// let network = Network::new(&[2, 3, 1], Activation::Sigmoid, &mut rng).unwrap();
    /// let mut propagation = Propagation::new(&network);
    /// let output = propagation.forward(&network, &[0.5, 0.8]).unwrap();
    /// assert_eq!(output.len(), 1);
    /// ```
    pub fn forward(&mut self, network: &Network, input: &[f64]) -> Result<&[f64], NetworkError> {
        let expected = network.input_size();
        if input.len() != expected {
            return Err(NetworkError::DimensionMismatch {
                expected,
                actual: input.len(),
            });
        }
        self.ensure_shape(network);

        self.activations[0].copy_from_slice(input);
        let activation = network.activation();
        for l in 1..network.layers().len() {
            let layer = &network.layers()[l];
            let (prev_part, curr_part) = self.activations.split_at_mut(l);
            let prev = prev_part[l - 1].as_slice();
            let curr = curr_part[0].as_mut_slice();

            curr.copy_from_slice(layer.bias());
            for (i, &a) in prev.iter().enumerate() {
                for (z, w) in curr.iter_mut().zip(layer.weights().row(i)) {
                    *z += a * w;
                }
            }
            for z in curr.iter_mut() {
                *z = activation.apply(*z);
            }
        }

        Ok(self.output())
    }

    /// Runs `input` forward and returns the predicted class index.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::DimensionMismatch`] if `input` is not exactly
    /// as wide as the input layer.
    pub fn classify(&mut self, network: &Network, input: &[f64]) -> Result<usize, NetworkError> {
        let output = self.forward(network, input)?;
        Ok(argmax(output))
    }

    /// Computes the error term of every neuron for the most recent forward
    /// pass against `target`.
    ///
    /// Output neurons get `2 * (a - t) * f'(a)`; hidden neurons fold back
    /// their downstream error terms through the connecting weights. The
    /// derivative is always taken from the stored activation value.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::DimensionMismatch`] if `target` is not exactly
    /// as wide as the output layer.
    pub fn backward(&mut self, network: &Network, target: &[f64]) -> Result<(), NetworkError> {
        let expected = network.output_size();
        if target.len() != expected {
            return Err(NetworkError::DimensionMismatch {
                expected,
                actual: target.len(),
            });
        }
        self.ensure_shape(network);

        let activation = network.activation();
        let last = network.layers().len() - 1;
        {
            let output = &self.activations[last];
            let errors = &mut self.error_terms[last];
            for ((e, &a), &t) in errors.iter_mut().zip(output).zip(target) {
                *e = 2.0 * (a - t) * activation.derivative_from_output(a);
            }
        }

        for l in (1..last).rev() {
            let next = &network.layers()[l + 1];
            let (err_part, err_next_part) = self.error_terms.split_at_mut(l + 1);
            let errors_next = err_next_part[0].as_slice();
            let errors = err_part[l].as_mut_slice();
            let activations = self.activations[l].as_slice();
            for i in 0..errors.len() {
                let upstream: f64 = next
                    .weights()
                    .row(i)
                    .iter()
                    .zip(errors_next)
                    .map(|(w, e)| w * e)
                    .sum();
                errors[i] = upstream * activation.derivative_from_output(activations[i]);
            }
        }
        Ok(())
    }

    /// Summed squared error of the most recent forward pass against `target`.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::DimensionMismatch`] if `target` is not exactly
    /// as wide as the output layer.
    pub fn cost(&self, target: &[f64]) -> Result<f64, NetworkError> {
        let output = self.output();
        if target.len() != output.len() {
            return Err(NetworkError::DimensionMismatch {
                expected: output.len(),
                actual: target.len(),
            });
        }
        Ok(output
            .iter()
            .zip(target)
            .map(|(a, t)| (a - t) * (a - t))
            .sum())
    }

    /// Returns the output layer's activations from the most recent forward
    /// pass.
    #[must_use]
    pub fn output(&self) -> &[f64] {
        self.activations.last().map_or(&[], Vec::as_slice)
    }

    /// Returns the activations of one layer.
    #[must_use]
    pub fn activations(&self, layer: usize) -> &[f64] {
        &self.activations[layer]
    }

    /// Returns the error terms of one layer.
    #[must_use]
    pub fn error_terms(&self, layer: usize) -> &[f64] {
        &self.error_terms[layer]
    }

    /// Resizes the buffers to fit `network`, keeping them untouched when the
    /// shapes already agree.
    fn ensure_shape(&mut self, network: &Network) {
        let layers = network.layers();
        self.activations.resize(layers.len(), Vec::new());
        self.error_terms.resize(layers.len(), Vec::new());
        for (l, layer) in layers.iter().enumerate() {
            if self.activations[l].len() != layer.neurons() {
                self.activations[l] = vec![0.0; layer.neurons()];
            }
            if self.error_terms[l].len() != layer.neurons() {
                self.error_terms[l] = vec![0.0; layer.neurons()];
            }
        }
    }

    /// Confirms the buffers match `network`, for operations that consume a
    /// finished pass.
    pub(crate) fn check_shape(&self, network: &Network) -> Result<(), NetworkError> {
        let layers = network.layers();
        if self.activations.len() != layers.len() {
            return Err(NetworkError::DimensionMismatch {
                expected: layers.len(),
                actual: self.activations.len(),
            });
        }
        for (l, layer) in layers.iter().enumerate() {
            if self.activations[l].len() != layer.neurons()
                || self.error_terms[l].len() != layer.neurons()
            {
                return Err(NetworkError::DimensionMismatch {
                    expected: layer.neurons(),
                    actual: self.activations[l].len(),
                });
            }
        }
        Ok(())
    }
}

/// Index of the largest value in `values`.
///
/// Comparison is strict, so the earliest of several equal maxima wins. An
/// empty slice reports index 0.
///
/// # Examples
///
/// ```
/// use neural_network::argmax;
///
/// assert_eq!(argmax(&[0.1, 0.9, 0.3]), 1);
/// assert_eq!(argmax(&[0.5, 0.9, 0.9]), 1);
/// ```
#[must_use]
pub fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = i;
        }
    }
    best
}
