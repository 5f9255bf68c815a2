//! Parameter update rules.
//!
//! The rule is picked once per training run. Plain descent and mini-batch
//! averaging are stateless; momentum carries velocity buffers shaped like
//! the network, and refuses to run when the shapes disagree.

use crate::error::NetworkError;
use crate::gradient::Gradients;
use crate::network::Network;
use crate::propagation::Propagation;
use matrix::Matrix;

/// Exponential moving averages of past gradients, laid out like the
/// network's layers.
#[derive(Debug, Clone, PartialEq)]
pub struct Velocity {
    pub(crate) weights: Vec<Matrix>,
    pub(crate) biases: Vec<Vec<f64>>,
}

impl Velocity {
    /// Creates zeroed velocity buffers shaped like `network`.
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

    fn check_shape(&self, network: &Network) -> Result<(), NetworkError> {
        let layers = network.layers();
        let fits = self.weights.len() == layers.len()
            && self.biases.len() == layers.len()
            && layers.iter().enumerate().all(|(l, layer)| {
                self.weights[l].rows() == layer.weights().rows()
                    && self.weights[l].cols() == layer.weights().cols()
                    && self.biases[l].len() == layer.bias().len()
            });
        if fits {
            Ok(())
        } else {
            Err(NetworkError::OptimizerMismatch(format!(
                "velocity buffers do not fit a network with layers {:?}",
                network.layer_sizes()
            )))
        }
    }
}

/// The update rule applied to the network's parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Optimizer {
    /// Per-example stochastic gradient descent.
    Sgd,
    /// Descent smoothed by an exponential moving average of gradients:
    /// `v = rate * v + (1 - rate) * g`, then `parameter -= learning_rate * v`.
    Momentum { rate: f64, velocity: Velocity },
    /// Updates from gradients averaged over fixed-size batches.
    MiniBatch { batch_size: usize },
}

impl Optimizer {
    /// Creates a momentum optimizer with zeroed velocity shaped for
    /// `network`.
    ///
    /// Velocity always starts from zero; it is never persisted, so a
    /// resumed run warms it up again. A rate of 0.9 is the usual choice.
    #[must_use]
    pub fn momentum(rate: f64, network: &Network) -> Self {
        Optimizer::Momentum {
            rate,
            velocity: Velocity::zeros(network),
        }
    }

    /// Short name for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Optimizer::Sgd => "sgd",
            Optimizer::Momentum { .. } => "momentum",
            Optimizer::MiniBatch { .. } => "mini-batch",
        }
    }

    /// Confirms the optimizer can drive `network`, before any step runs.
    ///
    /// # Errors
    ///
    /// Returns an error when momentum velocity does not match the network's
    /// shape, or when the batch size is zero.
    pub fn validate(&self, network: &Network) -> Result<(), NetworkError> {
        match self {
            Optimizer::Sgd => Ok(()),
            Optimizer::Momentum { velocity, .. } => velocity.check_shape(network),
            Optimizer::MiniBatch { batch_size } => {
                if *batch_size == 0 {
                    Err(NetworkError::InvalidArchitecture(
                        "batch size must be at least 1".into(),
                    ))
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Applies one per-example update from the error terms in `propagation`.
    ///
    /// Each weight moves against its gradient, which is the destination
    /// neuron's error term times the source neuron's activation captured
    /// during the forward pass. No update reads another layer's updated
    /// parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the scratch buffers do not match the network, if
    /// momentum velocity does not fit, or if this is the mini-batch rule,
    /// which only consumes averaged gradients.
    pub fn step(
        &mut self,
        network: &mut Network,
        propagation: &Propagation,
        learning_rate: f64,
    ) -> Result<(), NetworkError> {
        propagation.check_shape(network)?;
        match self {
            Optimizer::Sgd => {
                for l in 1..network.layers.len() {
                    let layer = &mut network.layers[l];
                    let errors = propagation.error_terms(l);
                    let prev_activations = propagation.activations(l - 1);
                    for (i, &a) in prev_activations.iter().enumerate() {
                        for (w, &e) in layer.weights.row_mut(i).iter_mut().zip(errors) {
                            *w -= learning_rate * e * a;
                        }
                    }
                    for (b, &e) in layer.bias.iter_mut().zip(errors) {
                        *b -= learning_rate * e;
                    }
                }
                Ok(())
            }
            Optimizer::Momentum { rate, velocity } => {
                velocity.check_shape(network)?;
                let rate = *rate;
                for l in 1..network.layers.len() {
                    let layer = &mut network.layers[l];
                    let errors = propagation.error_terms(l);
                    let prev_activations = propagation.activations(l - 1);
                    let velocity_weights = &mut velocity.weights[l];
                    for (i, &a) in prev_activations.iter().enumerate() {
                        let weight_row = layer.weights.row_mut(i).iter_mut();
                        let velocity_row = velocity_weights.row_mut(i).iter_mut();
                        for ((w, v), &e) in weight_row.zip(velocity_row).zip(errors) {
                            *v = rate * *v + (1.0 - rate) * (e * a);
                            *w -= learning_rate * *v;
                        }
                    }
                    let velocity_biases = velocity.biases[l].iter_mut();
                    for ((b, v), &e) in layer.bias.iter_mut().zip(velocity_biases).zip(errors) {
                        *v = rate * *v + (1.0 - rate) * e;
                        *b -= learning_rate * *v;
                    }
                }
                Ok(())
            }
            Optimizer::MiniBatch { .. } => Err(NetworkError::OptimizerMismatch(
                "the mini-batch rule consumes averaged gradients; call apply_gradients".into(),
            )),
        }
    }

    /// Applies an averaged gradient to every parameter.
    ///
    /// # Errors
    ///
    /// Returns an error if the gradients are not shaped like the network, or
    /// if momentum velocity does not fit.
    pub fn apply_gradients(
        &mut self,
        network: &mut Network,
        gradients: &Gradients,
        learning_rate: f64,
    ) -> Result<(), NetworkError> {
        gradients.check_shape(network)?;
        match self {
            Optimizer::Sgd | Optimizer::MiniBatch { .. } => {
                for l in 1..network.layers.len() {
                    let layer = &mut network.layers[l];
                    for i in 0..layer.prev_neurons {
                        let gradient_row = gradients.weights[l].row(i);
                        for (w, &g) in layer.weights.row_mut(i).iter_mut().zip(gradient_row) {
                            *w -= learning_rate * g;
                        }
                    }
                    for (b, &g) in layer.bias.iter_mut().zip(&gradients.biases[l]) {
                        *b -= learning_rate * g;
                    }
                }
                Ok(())
            }
            Optimizer::Momentum { rate, velocity } => {
                velocity.check_shape(network)?;
                let rate = *rate;
                for l in 1..network.layers.len() {
                    let layer = &mut network.layers[l];
                    let velocity_weights = &mut velocity.weights[l];
                    for i in 0..layer.prev_neurons {
                        let weight_row = layer.weights.row_mut(i).iter_mut();
                        let velocity_row = velocity_weights.row_mut(i).iter_mut();
                        let gradient_row = gradients.weights[l].row(i);
                        for ((w, v), &g) in weight_row.zip(velocity_row).zip(gradient_row) {
                            *v = rate * *v + (1.0 - rate) * g;
                            *w -= learning_rate * *v;
                        }
                    }
                    let velocity_biases = velocity.biases[l].iter_mut();
                    let gradient_biases = gradients.biases[l].iter();
                    for ((b, v), &g) in layer.bias.iter_mut().zip(velocity_biases).zip(gradient_biases)
                    {
                        *v = rate * *v + (1.0 - rate) * g;
                        *b -= learning_rate * *v;
                    }
                }
                Ok(())
            }
        }
    }
}
