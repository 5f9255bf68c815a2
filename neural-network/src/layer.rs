//! Per-layer parameter storage.

use crate::error::NetworkError;
use matrix::Matrix;
use rand::Rng;
use rand_distr::StandardNormal;

/// One layer of the network: its width plus, past the input layer, the
/// weights and biases feeding it.
///
/// Weights are stored row-major with one row per neuron of the previous
/// layer and one column per neuron of this layer. The input layer carries
/// no parameters: its weight matrix is 0 x 0 and its bias vector is empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub(crate) neurons: usize,
    pub(crate) prev_neurons: usize,
    pub(crate) weights: Matrix,
    pub(crate) bias: Vec<f64>,
}

impl Layer {
    /// Creates the input layer, which holds activations but no parameters.
    #[must_use]
    pub fn input(neurons: usize) -> Self {
        Self {
            neurons,
            prev_neurons: 0,
            weights: Matrix::zeros(0, 0),
            bias: Vec::new(),
        }
    }

    /// Creates a layer with weights and biases drawn from a zero-mean
    /// Gaussian scaled by `1 / sqrt(prev_neurons)`.
    ///
    /// # Panics
    ///
    /// Panics if `prev_neurons` is zero; the input layer is built with
    /// [`Layer::input`] instead.
    #[must_use]
    pub fn random<R: Rng + ?Sized>(neurons: usize, prev_neurons: usize, rng: &mut R) -> Self {
        assert!(prev_neurons > 0, "a parameterized layer needs inputs");
        let std_dev = 1.0 / (prev_neurons as f64).sqrt();
        let weights = Matrix::random(prev_neurons, neurons, std_dev, rng);
        let bias = (0..neurons)
            .map(|_| rng.sample::<f64, _>(StandardNormal) * std_dev)
            .collect();
        Self {
            neurons,
            prev_neurons,
            weights,
            bias,
        }
    }

    /// Rebuilds a layer from stored parameters, validating their shapes.
    ///
    /// # Errors
    ///
    /// Returns an error if the weight matrix is not `prev_neurons x neurons`,
    /// if the bias length differs from `neurons`, or if a layer with zero
    /// incoming neurons carries parameters.
    pub fn from_parts(
        neurons: usize,
        prev_neurons: usize,
        weights: Matrix,
        bias: Vec<f64>,
    ) -> Result<Self, NetworkError> {
        if neurons == 0 {
            return Err(NetworkError::InvalidArchitecture(
                "a layer needs at least one neuron".into(),
            ));
        }
        if prev_neurons == 0 {
            if weights.rows() != 0 || weights.cols() != 0 || !bias.is_empty() {
                return Err(NetworkError::InvalidArchitecture(
                    "the input layer carries no weights or biases".into(),
                ));
            }
            return Ok(Self {
                neurons,
                prev_neurons,
                weights,
                bias,
            });
        }
        if weights.rows() != prev_neurons || weights.cols() != neurons {
            return Err(NetworkError::DimensionMismatch {
                expected: prev_neurons * neurons,
                actual: weights.rows() * weights.cols(),
            });
        }
        if bias.len() != neurons {
            return Err(NetworkError::DimensionMismatch {
                expected: neurons,
                actual: bias.len(),
            });
        }
        Ok(Self {
            neurons,
            prev_neurons,
            weights,
            bias,
        })
    }

    /// Returns the number of neurons in this layer.
    #[must_use]
    pub fn neurons(&self) -> usize {
        self.neurons
    }

    /// Returns the number of neurons feeding this layer.
    #[must_use]
    pub fn prev_neurons(&self) -> usize {
        self.prev_neurons
    }

    /// Returns the incoming weight matrix, `prev_neurons` rows by
    /// `neurons` columns.
    #[must_use]
    pub fn weights(&self) -> &Matrix {
        &self.weights
    }

    /// Returns the bias for each neuron.
    #[must_use]
    pub fn bias(&self) -> &[f64] {
        &self.bias
    }
}
