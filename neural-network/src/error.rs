use thiserror::Error;

/// Errors produced while building, running, or persisting a network.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Wrapper for standard I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A vector had the wrong length for the requested operation
    #[error("dimension mismatch: expected {expected} values, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The requested layer layout cannot form a network
    #[error("invalid architecture: {0}")]
    InvalidArchitecture(String),

    /// A persisted model file failed validation
    #[error("invalid model file at line {line}: {reason}")]
    InvalidModelFile { line: usize, reason: String },

    /// Optimizer state does not fit the network it was asked to update
    #[error("optimizer mismatch: {0}")]
    OptimizerMismatch(String),

    /// A configuration file could not be parsed
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}
