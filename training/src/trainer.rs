//! Training loop: a fixed epoch budget with per-epoch evaluation and
//! checkpoints whenever test accuracy improves.

use std::path::PathBuf;
use std::time::Instant;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use neural_network::{batch_gradients, Network, Optimizer, Propagation};
use rand::seq::SliceRandom;

use crate::dataset::Dataset;
use crate::error::TrainingError;
use crate::evaluate::evaluate_with;
use crate::history::{EpochRecord, TrainingHistory};

/// Configuration parameters for a training run.
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    /// Number of training epochs. The budget is fixed; every epoch runs.
    pub epochs: u32,
    /// Learning rate for gradient descent.
    pub learning_rate: f64,
    /// Where to save the network whenever test accuracy improves.
    pub checkpoint_path: Option<PathBuf>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: 100,
            learning_rate: 0.05,
            checkpoint_path: None,
        }
    }
}

/// Trainer manages the network training process.
///
/// The trainer handles:
/// - Training loop execution over a fixed epoch budget
/// - Per-epoch evaluation against the test set
/// - Progress visualization
/// - Checkpointing the best network seen so far
pub struct Trainer {
    network: Network,
    optimizer: Optimizer,
    config: TrainingConfig,
    history: TrainingHistory,
}

impl Trainer {
    /// Creates a trainer that drives `network` with `optimizer`.
    #[must_use]
    pub fn new(network: Network, optimizer: Optimizer, config: TrainingConfig) -> Self {
        Self {
            network,
            optimizer,
            config,
            history: TrainingHistory::new(),
        }
    }

    /// The network in its current state.
    #[must_use]
    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Consumes the trainer and hands back the network.
    #[must_use]
    pub fn into_network(self) -> Network {
        self.network
    }

    /// Metrics recorded so far.
    #[must_use]
    pub fn history(&self) -> &TrainingHistory {
        &self.history
    }

    /// Runs the full epoch budget over `train`, evaluating against `test`
    /// after every epoch.
    ///
    /// Examples are shuffled each epoch. The mini-batch rule accumulates
    /// averaged gradients per batch; the other rules update per example.
    /// Whenever test accuracy beats the best seen so far, the network is
    /// written to the configured checkpoint path.
    ///
    /// # Errors
    ///
    /// Returns an error when the optimizer does not fit the network, when
    /// an example does not fit the network, or when a checkpoint cannot be
    /// written.
    pub fn train(&mut self, train: &Dataset<'_>, test: &Dataset<'_>) -> Result<(), TrainingError> {
        self.optimizer.validate(&self.network)?;

        let mut propagation = Propagation::new(&self.network);
        let mut best_accuracy = evaluate_with(&mut propagation, &self.network, test)?;
        println!("Epoch 0 (initialisation): accuracy {best_accuracy:.2}%");

        let batch_size = match &self.optimizer {
            Optimizer::MiniBatch { batch_size } => Some(*batch_size),
            _ => None,
        };

        println!(
            "\nStarting {} training for {} epochs",
            self.optimizer.name(),
            self.config.epochs
        );

        let multi_progress = MultiProgress::new();
        let epoch_progress = multi_progress.add(ProgressBar::new(u64::from(self.config.epochs)));
        let step_progress = multi_progress.add(ProgressBar::new(0));
        epoch_progress.set_style(create_progress_style(
            "{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} Epoch {msg}",
        ));
        step_progress.set_style(create_progress_style(
            "{spinner:.yellow} [{elapsed_precise}] {bar:40.yellow/blue} {pos:>7}/{len:7} Step {msg}",
        ));

        let mut indices: Vec<usize> = (0..train.len()).collect();
        let mut rng = rand::rng();
        let mut batch: Vec<(&[f64], &[f64])> = Vec::with_capacity(batch_size.unwrap_or(0));

        for epoch in 1..=self.config.epochs {
            let train_started = Instant::now();
            indices.shuffle(&mut rng);
            let mut epoch_cost = 0.0;

            step_progress.set_position(0);
            step_progress.set_message(format!("in Epoch {epoch}"));

            if let Some(batch_size) = batch_size {
                step_progress.set_length(indices.len().div_ceil(batch_size) as u64);

                for batch_indices in indices.chunks(batch_size) {
                    batch.clear();
                    batch.extend(batch_indices.iter().map(|&index| train.example(index)));
                    let (gradients, cost) =
                        batch_gradients(&self.network, &batch, batch_size)?;
                    self.optimizer.apply_gradients(
                        &mut self.network,
                        &gradients,
                        self.config.learning_rate,
                    )?;
                    epoch_cost += cost;
                    step_progress.inc(1);
                }
            } else {
                step_progress.set_length(indices.len() as u64);

                for &index in &indices {
                    let (input, target) = train.example(index);
                    propagation.forward(&self.network, input)?;
                    epoch_cost += propagation.cost(target)?;
                    propagation.backward(&self.network, target)?;
                    self.optimizer.step(
                        &mut self.network,
                        &propagation,
                        self.config.learning_rate,
                    )?;
                    step_progress.inc(1);
                }
            }

            let train_time = train_started.elapsed();
            let eval_started = Instant::now();
            let accuracy = evaluate_with(&mut propagation, &self.network, test)?;
            let eval_time = eval_started.elapsed();
            let avg_cost = epoch_cost / train.len() as f64;

            epoch_progress.set_message(format!(
                "- Accuracy: {accuracy:.2}%, Avg cost: {avg_cost:.4} (train {:.1}s, eval {:.1}s)",
                train_time.as_secs_f64(),
                eval_time.as_secs_f64()
            ));
            epoch_progress.inc(1);

            self.history.record(EpochRecord {
                epoch,
                accuracy,
                avg_cost,
                train_time,
                eval_time,
            });

            if accuracy > best_accuracy {
                best_accuracy = accuracy;
                if let Some(path) = &self.config.checkpoint_path {
                    self.network.save(path)?;
                }
            }
        }

        epoch_progress.finish_with_message("Training completed!");
        step_progress.finish_and_clear();

        self.history.print_summary();

        Ok(())
    }
}

/// Creates a progress bar style with the specified template.
fn create_progress_style(template: &str) -> ProgressStyle {
    ProgressStyle::with_template(template)
        .unwrap()
        .progress_chars("##-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use neural_network::{Activation, Layer, Matrix, NetworkError};

    // Crossed weights classify both unit inputs as the wrong class, so
    // accuracy starts at zero and training has somewhere to go.
    fn crossed_network() -> Network {
        let weights = Matrix::new(2, 2, vec![-1.0, 1.0, 1.0, -1.0]);
        let layers = vec![
            Layer::input(2),
            Layer::from_parts(2, 2, weights, vec![0.0, 0.0]).expect("output layer"),
        ];
        Network::from_parts(layers, Activation::Sigmoid).expect("network should build")
    }

    fn unit_examples() -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
        let inputs = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        let targets = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        (inputs, targets)
    }

    #[test]
    fn test_training_config_default() {
        let config = TrainingConfig::default();
        assert_eq!(config.epochs, 100);
        assert_eq!(config.learning_rate, 0.05);
        assert_eq!(config.checkpoint_path, None);
    }

    #[test]
    fn test_sgd_learns_and_checkpoints() -> Result<(), TrainingError> {
        let dir = tempfile::tempdir().expect("temp dir");
        let checkpoint = dir.path().join("checkpoint.txt");

        let (inputs, targets) = unit_examples();
        let data = Dataset::new(&inputs, &targets)?;

        let mut trainer = Trainer::new(
            crossed_network(),
            Optimizer::Sgd,
            TrainingConfig {
                epochs: 100,
                learning_rate: 0.5,
                checkpoint_path: Some(checkpoint.clone()),
            },
        );
        trainer.train(&data, &data)?;

        let best = trainer.history().best().map(|(_, accuracy)| accuracy);
        assert_eq!(best, Some(100.0));

        assert!(checkpoint.exists());
        let saved = Network::load(&checkpoint, Activation::Sigmoid)
            .map_err(TrainingError::Network)?;
        assert_eq!(saved.layer_sizes(), vec![2, 2]);
        Ok(())
    }

    #[test]
    fn test_epoch_budget_runs_every_epoch() -> Result<(), TrainingError> {
        let (inputs, targets) = unit_examples();
        let data = Dataset::new(&inputs, &targets)?;

        let mut trainer = Trainer::new(
            crossed_network(),
            Optimizer::Sgd,
            TrainingConfig {
                epochs: 3,
                learning_rate: 0.1,
                checkpoint_path: None,
            },
        );
        trainer.train(&data, &data)?;

        let epochs: Vec<u32> = trainer
            .history()
            .epochs()
            .iter()
            .map(|record| record.epoch)
            .collect();
        assert_eq!(epochs, vec![1, 2, 3]);
        Ok(())
    }

    #[test]
    fn test_mini_batch_handles_short_final_batch() -> Result<(), TrainingError> {
        let inputs = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]];
        let targets = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0]];
        let data = Dataset::new(&inputs, &targets)?;

        let mut trainer = Trainer::new(
            crossed_network(),
            Optimizer::MiniBatch { batch_size: 2 },
            TrainingConfig {
                epochs: 2,
                learning_rate: 0.1,
                checkpoint_path: None,
            },
        );
        trainer.train(&data, &data)?;

        assert_eq!(trainer.history().epochs().len(), 2);
        Ok(())
    }

    #[test]
    fn test_momentum_learns() -> Result<(), TrainingError> {
        let (inputs, targets) = unit_examples();
        let data = Dataset::new(&inputs, &targets)?;

        let network = crossed_network();
        let optimizer = Optimizer::momentum(0.9, &network);
        let mut trainer = Trainer::new(
            network,
            optimizer,
            TrainingConfig {
                epochs: 200,
                learning_rate: 0.5,
                checkpoint_path: None,
            },
        );
        trainer.train(&data, &data)?;

        let best = trainer.history().best().map(|(_, accuracy)| accuracy);
        assert_eq!(best, Some(100.0));
        Ok(())
    }

    #[test]
    fn test_mismatched_momentum_fails_before_training() -> Result<(), TrainingError> {
        let (inputs, targets) = unit_examples();
        let data = Dataset::new(&inputs, &targets)?;

        let other_shape = {
            let weights = Matrix::new(2, 3, vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6]);
            let layers = vec![
                Layer::input(2),
                Layer::from_parts(3, 2, weights, vec![0.0, 0.0, 0.0]).expect("layer"),
            ];
            Network::from_parts(layers, Activation::Sigmoid).expect("network")
        };

        let network = crossed_network();
        let mut trainer = Trainer::new(
            network.clone(),
            Optimizer::momentum(0.9, &other_shape),
            TrainingConfig::default(),
        );

        let result = trainer.train(&data, &data);
        match result {
            Err(TrainingError::Network(NetworkError::OptimizerMismatch(_))) => {}
            _ => panic!("Expected OptimizerMismatch error"),
        }
        assert_eq!(trainer.network(), &network);
        Ok(())
    }
}
