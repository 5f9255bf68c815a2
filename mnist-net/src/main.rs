use anyhow::{anyhow, Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use mnist::{load_test_data, load_training_data};
use neural_network::{argmax, Network, NetworkConfig, Optimizer, Propagation};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use training::{Dataset, Trainer, TrainingConfig};

/// A confusion matrix for tracking model predictions vs actual values
#[derive(Debug, Default)]
struct ConfusionMatrix {
    matrix: [[usize; 10]; 10],
}

impl ConfusionMatrix {
    /// Creates a new empty confusion matrix
    pub fn new() -> Self {
        Self {
            matrix: [[0; 10]; 10],
        }
    }

    /// Records a prediction in the confusion matrix
    pub fn record(&mut self, actual: usize, predicted: usize) {
        self.matrix[actual][predicted] += 1;
    }

    /// Gets the value at a specific position
    pub fn get(&self, actual: usize, predicted: usize) -> usize {
        self.matrix[actual][predicted]
    }
}

impl std::fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\nConfusion Matrix:")?;
        writeln!(f, "      Predicted →")?;
        writeln!(
            f,
            "Actual     0    1    2    3    4    5    6    7    8    9"
        )?;
        writeln!(
            f,
            "  ↓   +--------------------------------------------------"
        )?;
        for i in 0..10 {
            write!(f, "  {}   |", i)?;
            for j in 0..10 {
                write!(f, " {:4}", self.get(i, j))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Metrics for a single digit classification
struct DigitMetrics {
    accuracy: f64,
    precision: f64,
    recall: f64,
    f1: f64,
}

/// Helper function to create a consistent progress bar style
fn create_progress_bar(total: u64) -> Result<ProgressBar> {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:80.cyan/blue}] {pos}/{len} ({percent}%)")
            .context("Failed to set progress bar template")?
            .progress_chars("#>-")
    );
    Ok(pb)
}

/// Calculates metrics for a digit from the confusion matrix
fn calculate_metrics(confusion_matrix: &ConfusionMatrix, digit: usize) -> DigitMetrics {
    let true_positives = confusion_matrix.get(digit, digit);
    let total_actuals: usize = (0..10).map(|i| confusion_matrix.get(digit, i)).sum();
    let total_predictions: usize = (0..10).map(|i| confusion_matrix.get(i, digit)).sum();

    let accuracy = true_positives as f64 / total_actuals.max(1) as f64;
    let precision = true_positives as f64 / total_predictions.max(1) as f64;
    let recall = true_positives as f64 / total_actuals.max(1) as f64;
    let f1 = if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    };

    DigitMetrics {
        accuracy,
        precision,
        recall,
        f1,
    }
}

/// Prints detailed metrics for the network's performance, including per-digit
/// statistics and overall accuracy.
///
/// # Metrics Explained
/// * Accuracy - Percentage of correct predictions for a specific digit
/// * Precision - Of all cases predicted as digit X, what percentage were actually X
/// * Recall - Of all actual cases of digit X, what percentage were correctly identified
/// * F1 Score - Harmonic mean of precision and recall (2 * precision * recall)/(precision + recall)
///
/// The overall accuracy represents the total correct predictions across all digits.
fn print_metrics(confusion_matrix: &ConfusionMatrix, total: usize) {
    let total_correct: usize = (0..10).map(|i| confusion_matrix.get(i, i)).sum();
    let overall_accuracy = (total_correct as f64) / (total as f64) * 100.0;

    println!("\nPer-digit Metrics:");
    println!("Digit  | Accuracy | Precision | Recall  | F1 Score");
    println!("-------|----------|-----------|---------|----------");

    for digit in 0..10 {
        let metrics = calculate_metrics(confusion_matrix, digit);
        println!(
            "   {}   |  {:.1}%   |   {:.1}%   |  {:.1}%  |   {:.1}%",
            digit,
            metrics.accuracy * 100.0,
            metrics.precision * 100.0,
            metrics.recall * 100.0,
            metrics.f1 * 100.0
        );
    }

    println!("\nOverall Accuracy: {:.2}%", overall_accuracy);
}

fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    let mut parts = Vec::new();
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if minutes > 0 {
        parts.push(format!("{}m", minutes));
    }
    if seconds > 0 || parts.is_empty() {
        parts.push(format!("{}s", seconds));
    }

    parts.join(" ")
}

fn load_config(path: Option<&Path>) -> Result<NetworkConfig> {
    match path {
        Some(path) => NetworkConfig::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => Ok(NetworkConfig::default()),
    }
}

fn train(
    data_dir: &Path,
    config_path: Option<&Path>,
    optimizer_kind: OptimizerKind,
    output: &Path,
    resume: Option<&Path>,
) -> Result<()> {
    let config = load_config(config_path)?;
    println!("{config}");

    println!("\nLoading MNIST training data...");
    let train_data = load_training_data(data_dir).context("Failed to load training data")?;
    println!("Successfully loaded {} training examples", train_data.len());

    println!("\nLoading MNIST test data...");
    let test_data = load_test_data(data_dir).context("Failed to load test data")?;
    println!("Successfully loaded {} test examples", test_data.len());

    let network = match resume {
        Some(path) => {
            println!("\nResuming from {}...", path.display());
            Network::load(path, config.activation)
                .map_err(|e| anyhow!("Failed to load network: {}", e))?
        }
        None => {
            println!("\nInitializing network...");
            let mut rng = StdRng::seed_from_u64(config.seed);
            Network::new(&config.layers, config.activation, &mut rng)
                .map_err(|e| anyhow!("Failed to build network: {}", e))?
        }
    };

    let optimizer = match optimizer_kind {
        OptimizerKind::Sgd => Optimizer::Sgd,
        OptimizerKind::Momentum => Optimizer::momentum(config.momentum, &network),
        OptimizerKind::MiniBatch => Optimizer::MiniBatch {
            batch_size: config.batch_size,
        },
    };

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent).context("Failed to create models directory")?;
    }

    let train_set = Dataset::new(train_data.images(), train_data.labels())
        .context("Failed to assemble training dataset")?;
    let test_set = Dataset::new(test_data.images(), test_data.labels())
        .context("Failed to assemble test dataset")?;

    let mut trainer = Trainer::new(
        network,
        optimizer,
        TrainingConfig {
            epochs: config.epochs,
            learning_rate: config.learning_rate,
            checkpoint_path: Some(output.to_path_buf()),
        },
    );

    let start_time = Instant::now();
    trainer
        .train(&train_set, &test_set)
        .context("Training failed")?;
    let total_duration = start_time.elapsed();
    println!(
        "Total training time: {} ({:.2?})",
        format_duration(total_duration),
        total_duration
    );

    if output.exists() {
        println!("Best network saved to {}", output.display());
    } else {
        println!("Accuracy never improved on the initial network; nothing was saved");
    }

    Ok(())
}

fn evaluate(data_dir: &Path, model: &Path, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;

    println!("Loading MNIST test data...");
    let test_data = load_test_data(data_dir).context("Failed to load test data")?;

    println!("Loading trained network from {}...", model.display());
    let network = Network::load(model, config.activation)
        .map_err(|e| anyhow!("Failed to load trained network: {}", e))?;

    println!("\nTesting network predictions...");
    let progress_bar = create_progress_bar(test_data.len() as u64)?;
    let mut propagation = Propagation::new(&network);
    let mut confusion_matrix = ConfusionMatrix::new();

    for (image, label) in test_data.images().iter().zip(test_data.labels()) {
        let predicted = propagation
            .classify(&network, image)
            .map_err(|e| anyhow!("Failed to classify image: {}", e))?;
        confusion_matrix.record(argmax(label), predicted);
        progress_bar.inc(1);
    }

    progress_bar.finish_with_message("Testing complete");

    println!("{}", confusion_matrix);

    print_metrics(&confusion_matrix, test_data.len());

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Command::Train {
            data_dir,
            config,
            optimizer,
            output,
            resume,
        } => train(
            &data_dir,
            config.as_deref(),
            optimizer,
            &output,
            resume.as_deref(),
        )
        .context("Failed to train network")?,
        Command::Evaluate {
            data_dir,
            model,
            config,
        } => evaluate(&data_dir, &model, config.as_deref())
            .context("Failed to evaluate network")?,
    }

    Ok(())
}

#[derive(clap::Parser)]
#[command(name = "mnist-net", about = "MNIST digit classifier", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
#[command(about = "MNIST neural network operations")]
enum Command {
    /// Train a network on the MNIST dataset
    Train {
        /// Directory holding the MNIST IDX files
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
        /// JSON configuration file; built-in defaults apply when omitted
        #[arg(long)]
        config: Option<PathBuf>,
        /// Parameter update rule
        #[arg(long, value_enum, default_value = "sgd")]
        optimizer: OptimizerKind,
        /// Where to write the best network seen during training
        #[arg(long, default_value = "models/network.txt")]
        output: PathBuf,
        /// Resume from a previously saved network instead of a fresh one
        #[arg(long)]
        resume: Option<PathBuf>,
    },
    /// Evaluate a saved network on the MNIST test set
    Evaluate {
        /// Directory holding the MNIST IDX files
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
        /// Path to a saved network
        #[arg(long, default_value = "models/network.txt")]
        model: PathBuf,
        /// JSON configuration file; built-in defaults apply when omitted
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OptimizerKind {
    /// Per-example stochastic gradient descent
    Sgd,
    /// Gradient descent smoothed with momentum
    Momentum,
    /// Averaged updates over fixed-size batches
    MiniBatch,
}
