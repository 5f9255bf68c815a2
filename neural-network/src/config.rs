use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

use crate::activations::Activation;
use crate::error::NetworkError;

/// Configuration for building and training a network.
///
/// # Example
///
/// ```
/// use neural_network::NetworkConfig;
///
/// let config = NetworkConfig::default();
/// assert_eq!(config.layers, vec![784, 128, 10]);
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct NetworkConfig {
    /// Sizes of each layer, including input and output layers.
    /// For example, `[784, 128, 10]` represents a network with:
    /// - 784 input neurons
    /// - 128 hidden neurons
    /// - 10 output neurons
    pub layers: Vec<usize>,

    /// Activation applied by every non-input layer.
    pub activation: Activation,

    /// Learning rate for gradient descent.
    pub learning_rate: f64,

    /// Momentum coefficient, used when the momentum update rule is picked.
    pub momentum: f64,

    /// Number of training epochs. One epoch is one complete pass through
    /// the training dataset.
    pub epochs: u32,

    /// Batch size, used when the mini-batch update rule is picked.
    pub batch_size: usize,

    /// Seed for weight initialisation, so runs can be reproduced.
    pub seed: u64,
}

impl NetworkConfig {
    /// Loads a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use neural_network::NetworkConfig;
    /// use std::path::Path;
    ///
    /// # fn main() -> Result<(), neural_network::NetworkError> {
    /// let config = NetworkConfig::load(Path::new("config.json"))?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn load(path: &Path) -> Result<Self, NetworkError> {
        let config_str = fs::read_to_string(path)?;
        let config: NetworkConfig = serde_json::from_str(&config_str)?;
        Ok(config)
    }
}

/// Defaults sized for MNIST: 28x28 pixel images in, ten digit classes out.
impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            layers: vec![784, 128, 10],
            activation: Activation::Sigmoid,
            learning_rate: 0.05,
            momentum: 0.9,
            epochs: 100,
            batch_size: 32,
            seed: 0,
        }
    }
}

impl fmt::Display for NetworkConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Network configuration:")?;
        writeln!(f, "  layers:        {:?}", self.layers)?;
        writeln!(f, "  activation:    {:?}", self.activation)?;
        writeln!(f, "  learning rate: {}", self.learning_rate)?;
        writeln!(f, "  momentum:      {}", self.momentum)?;
        writeln!(f, "  epochs:        {}", self.epochs)?;
        writeln!(f, "  batch size:    {}", self.batch_size)?;
        write!(f, "  seed:          {}", self.seed)
    }
}
