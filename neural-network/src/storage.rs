//! Plain-text model persistence.
//!
//! A saved model is line oriented. The first line holds the layer count;
//! every following line describes one layer as comma separated values: the
//! neuron count, the previous layer's neuron count, the weights in row-major
//! order (one row per source neuron), then the biases. Every value is
//! followed by a comma, including the last. The format stores parameters
//! only, so loading asks the caller for the activation.

use std::fs;
use std::path::Path;

use crate::activations::Activation;
use crate::error::NetworkError;
use crate::layer::Layer;
use crate::network::Network;
use matrix::Matrix;

/// Renders `network` in the comma separated text format.
#[must_use]
pub fn encode(network: &Network) -> String {
    let mut text = String::new();
    text.push_str(&network.layers().len().to_string());
    text.push('\n');
    for layer in network.layers() {
        push_value(&mut text, layer.neurons() as f64);
        push_value(&mut text, layer.prev_neurons() as f64);
        for value in layer.weights().data() {
            push_value(&mut text, *value);
        }
        for value in layer.bias() {
            push_value(&mut text, *value);
        }
        text.push('\n');
    }
    text
}

fn push_value(text: &mut String, value: f64) {
    text.push_str(&value.to_string());
    text.push(',');
}

/// Parses a network from the comma separated text format.
///
/// The format stores no activation, so the caller supplies the one the
/// parameters were trained with.
///
/// # Errors
///
/// Returns [`NetworkError::InvalidModelFile`] with a one-based line number
/// when the text is truncated, holds a malformed value, or describes layers
/// whose shapes do not chain.
pub fn decode(text: &str, activation: Activation) -> Result<Network, NetworkError> {
    let mut lines = text.lines();
    let count_line = lines.next().ok_or_else(|| invalid(1, "missing layer count"))?;
    let layer_count = parse_usize(count_line.trim(), 1)?;
    if layer_count < 2 {
        return Err(invalid(1, "a network needs at least two layers"));
    }

    let mut layers: Vec<Layer> = Vec::with_capacity(layer_count);
    for index in 0..layer_count {
        let line_number = index + 2;
        let line = lines
            .next()
            .ok_or_else(|| invalid(line_number, "missing layer line"))?;
        let layer = parse_layer(line, line_number, layers.last())?;
        layers.push(layer);
    }

    if lines.any(|line| !line.trim().is_empty()) {
        return Err(invalid(
            layer_count + 2,
            "unexpected content after the last layer",
        ));
    }

    Network::from_parts(layers, activation)
}

fn parse_layer(
    line: &str,
    line_number: usize,
    previous: Option<&Layer>,
) -> Result<Layer, NetworkError> {
    let mut fields: Vec<&str> = line.split(',').collect();
    if fields.last() == Some(&"") {
        fields.pop();
    }
    if fields.len() < 2 {
        return Err(invalid(line_number, "expected a neuron count and a previous layer width"));
    }

    let neurons = parse_usize(fields[0], line_number)?;
    let prev_neurons = parse_usize(fields[1], line_number)?;
    match previous {
        None if prev_neurons != 0 => {
            return Err(invalid(line_number, "the input layer takes no incoming weights"));
        }
        Some(previous) if prev_neurons != previous.neurons() => {
            return Err(invalid(
                line_number,
                "previous layer width does not match the layer above",
            ));
        }
        _ => {}
    }

    let expected = 2 + prev_neurons * neurons + if prev_neurons == 0 { 0 } else { neurons };
    if fields.len() != expected {
        return Err(invalid(
            line_number,
            &format!("expected {} values, got {}", expected, fields.len()),
        ));
    }

    let mut values = Vec::with_capacity(fields.len() - 2);
    for field in &fields[2..] {
        values.push(parse_f64(field, line_number)?);
    }
    if prev_neurons == 0 {
        return Ok(Layer::input(neurons));
    }
    let (weight_values, bias_values) = values.split_at(prev_neurons * neurons);
    let weights = Matrix::new(prev_neurons, neurons, weight_values.to_vec());
    Layer::from_parts(neurons, prev_neurons, weights, bias_values.to_vec())
}

fn parse_usize(raw: &str, line_number: usize) -> Result<usize, NetworkError> {
    raw.parse()
        .map_err(|_| invalid(line_number, &format!("expected an integer, got '{raw}'")))
}

fn parse_f64(raw: &str, line_number: usize) -> Result<f64, NetworkError> {
    raw.parse()
        .map_err(|_| invalid(line_number, &format!("expected a number, got '{raw}'")))
}

fn invalid(line: usize, reason: &str) -> NetworkError {
    NetworkError::InvalidModelFile {
        line,
        reason: reason.to_string(),
    }
}

impl Network {
    /// Writes the network to `path` in the comma separated text format.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be written.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use neural_network::{Activation, Network};
    /// use rand::rngs::StdRng;
    /// use rand::SeedableRng;
    ///
    /// # fn main() -> Result<(), neural_network::NetworkError> {
    /// let mut rng = StdRng::seed_from_u64(42);
    /// let network = Network::new(&[784, 128, 10], Activation::Sigmoid, &mut rng)?;
    /// network.save("models/network.txt")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), NetworkError> {
        fs::write(path, encode(self))?;
        Ok(())
    }

    /// Reads a network from `path`, reusing `activation` for every layer.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or does not hold a
    /// well-formed model.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use neural_network::{Activation, Network};
    ///
    /// # fn main() -> Result<(), neural_network::NetworkError> {
    /// let network = Network::load("models/network.txt", Activation::Sigmoid)?;
    /// assert_eq!(network.input_size(), 784);
    /// # Ok(())
    /// # }
    /// ```
    pub fn load<P: AsRef<Path>>(path: P, activation: Activation) -> Result<Self, NetworkError> {
        decode(&fs::read_to_string(path)?, activation)
    }
}
