mod dataset;
mod error;
mod evaluate;
mod history;
mod trainer;

pub use dataset::Dataset;
pub use error::TrainingError;
pub use evaluate::evaluate;
pub use history::{EpochRecord, TrainingHistory};
pub use trainer::{Trainer, TrainingConfig};
