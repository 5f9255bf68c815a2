use neural_network::NetworkError;
use thiserror::Error;

/// Errors surfaced while preparing data or running the training loop.
#[derive(Error, Debug)]
pub enum TrainingError {
    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    #[error("data mismatch: {0}")]
    DataMismatch(String),
}
