// Modules
mod activations;
mod config;
mod error;
mod gradient;
mod layer;
mod network;
mod optimizer;
mod propagation;
mod storage;

pub use activations::{sigmoid, sigmoid_inverse, Activation, LEAKY_SLOPE, SATURATION_LIMIT};
pub use config::NetworkConfig;
pub use error::NetworkError;
pub use gradient::{batch_gradients, Gradients};
pub use layer::Layer;
pub use matrix::Matrix;
pub use network::Network;
pub use optimizer::{Optimizer, Velocity};
pub use propagation::{argmax, Propagation};
pub use storage::{decode, encode};
