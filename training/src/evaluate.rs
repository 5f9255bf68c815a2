use crate::dataset::Dataset;
use crate::error::TrainingError;
use neural_network::{argmax, Network, Propagation};

/// Returns the percentage of examples in `data` whose predicted class
/// matches the target class.
///
/// # Errors
///
/// Returns an error when an input does not fit the network.
pub fn evaluate(network: &Network, data: &Dataset<'_>) -> Result<f64, TrainingError> {
    let mut propagation = Propagation::new(network);
    evaluate_with(&mut propagation, network, data)
}

pub(crate) fn evaluate_with(
    propagation: &mut Propagation,
    network: &Network,
    data: &Dataset<'_>,
) -> Result<f64, TrainingError> {
    let mut correct = 0usize;
    for index in 0..data.len() {
        let (input, target) = data.example(index);
        if propagation.classify(network, input)? == argmax(target) {
            correct += 1;
        }
    }
    Ok(correct as f64 / data.len() as f64 * 100.0)
}
