use crate::activations::Activation;
use crate::error::NetworkError;
use crate::layer::Layer;
use rand::Rng;

/// A feed-forward network: an ordered stack of layers sharing one
/// activation function.
///
/// The struct owns parameters only. Per-pass scratch state lives in
/// [`Propagation`](crate::Propagation), so one set of parameters can serve
/// the sequential and the batched execution paths alike.
///
/// # Examples
///
/// ```
/// use neural_network::{Activation, Network};
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
///
/// let mut rng = StdRng::seed_from_u64(7);
/// let network = Network::new(&[784, 128, 10], Activation::Sigmoid, &mut rng).unwrap();
/// assert_eq!(network.layer_sizes(), vec![784, 128, 10]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    pub(crate) layers: Vec<Layer>,
    pub(crate) activation: Activation,
}

impl Network {
    /// Creates a network with Gaussian-initialized parameters.
    ///
    /// # Arguments
    ///
    /// * `sizes` - The width of every layer, input first
    /// * `activation` - The nonlinearity shared by every layer past the input
    /// * `rng` - The generator the initial parameters are drawn from; a
    ///   seeded generator reproduces the exact same starting network
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than two layer sizes are given or if any
    /// layer is zero neurons wide.
    pub fn new<R: Rng + ?Sized>(
        sizes: &[usize],
        activation: Activation,
        rng: &mut R,
    ) -> Result<Self, NetworkError> {
        if sizes.len() < 2 {
            return Err(NetworkError::InvalidArchitecture(
                "a network needs an input layer and at least one other layer".into(),
            ));
        }
        if sizes.iter().any(|&width| width == 0) {
            return Err(NetworkError::InvalidArchitecture(
                "every layer needs at least one neuron".into(),
            ));
        }

        let mut layers = Vec::with_capacity(sizes.len());
        layers.push(Layer::input(sizes[0]));
        for window in sizes.windows(2) {
            layers.push(Layer::random(window[1], window[0], rng));
        }
        Ok(Self { layers, activation })
    }

    /// Assembles a network from prebuilt layers, validating the chain.
    ///
    /// # Errors
    ///
    /// Returns an error unless the first layer is an input layer and every
    /// later layer expects exactly as many inputs as its predecessor has
    /// neurons.
    pub fn from_parts(layers: Vec<Layer>, activation: Activation) -> Result<Self, NetworkError> {
        if layers.len() < 2 {
            return Err(NetworkError::InvalidArchitecture(
                "a network needs an input layer and at least one other layer".into(),
            ));
        }
        if layers[0].prev_neurons != 0 {
            return Err(NetworkError::InvalidArchitecture(
                "the first layer must be an input layer".into(),
            ));
        }
        for l in 1..layers.len() {
            if layers[l].prev_neurons == 0 {
                return Err(NetworkError::InvalidArchitecture(format!(
                    "layer {l} has no incoming weights"
                )));
            }
            if layers[l].prev_neurons != layers[l - 1].neurons {
                return Err(NetworkError::InvalidArchitecture(format!(
                    "layer {} expects {} inputs but the previous layer has {} neurons",
                    l,
                    layers[l].prev_neurons,
                    layers[l - 1].neurons
                )));
            }
        }
        if layers.iter().any(|layer| layer.neurons == 0) {
            return Err(NetworkError::InvalidArchitecture(
                "every layer needs at least one neuron".into(),
            ));
        }
        Ok(Self { layers, activation })
    }

    /// Returns the layers, input first.
    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Returns the activation shared by every layer past the input.
    #[must_use]
    pub fn activation(&self) -> Activation {
        self.activation
    }

    /// Returns the width of the input layer.
    #[must_use]
    pub fn input_size(&self) -> usize {
        self.layers.first().map_or(0, |layer| layer.neurons)
    }

    /// Returns the width of the output layer.
    #[must_use]
    pub fn output_size(&self) -> usize {
        self.layers.last().map_or(0, |layer| layer.neurons)
    }

    /// Returns the width of every layer, input first.
    #[must_use]
    pub fn layer_sizes(&self) -> Vec<usize> {
        self.layers.iter().map(|layer| layer.neurons).collect()
    }

    /// Returns the total number of weights and biases.
    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.layers
            .iter()
            .map(|layer| layer.weights.rows() * layer.weights.cols() + layer.bias.len())
            .sum()
    }
}
