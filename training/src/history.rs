use std::time::Duration;

/// Metrics captured for one training epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct EpochRecord {
    pub epoch: u32,
    /// Test-set accuracy after this epoch, as a percentage.
    pub accuracy: f64,
    /// Average cost per training example over this epoch.
    pub avg_cost: f64,
    pub train_time: Duration,
    pub eval_time: Duration,
}

/// Per-epoch metrics recorded during a training run.
#[derive(Debug, Clone, Default)]
pub struct TrainingHistory {
    epochs: Vec<EpochRecord>,
}

impl TrainingHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, record: EpochRecord) {
        self.epochs.push(record);
    }

    #[must_use]
    pub fn epochs(&self) -> &[EpochRecord] {
        &self.epochs
    }

    /// The epoch with the highest accuracy; ties keep the earliest epoch.
    #[must_use]
    pub fn best(&self) -> Option<(u32, f64)> {
        self.epochs.iter().fold(None, |best, record| match best {
            Some((_, accuracy)) if record.accuracy <= accuracy => best,
            _ => Some((record.epoch, record.accuracy)),
        })
    }

    /// Prints a summary of the training history.
    pub fn print_summary(&self) {
        let Some((best_epoch, best_accuracy)) = self.best() else {
            return;
        };
        println!("\nTraining History Summary:");
        println!("------------------------");
        println!("Best accuracy: {best_accuracy:.2}% (epoch {best_epoch})");
        if let Some(last) = self.epochs.last() {
            println!("Final accuracy: {:.2}%", last.accuracy);
            println!("Final avg cost: {:.4}", last.avg_cost);
        }
        let total: Duration = self
            .epochs
            .iter()
            .map(|record| record.train_time + record.eval_time)
            .sum();
        println!("Total time: {:.1}s", total.as_secs_f64());

        // Print accuracy progression at 25% intervals
        let len = self.epochs.len();
        if len >= 4 {
            println!("\nAccuracy progression:");
            for i in 0..=3 {
                let record = &self.epochs[i * (len - 1) / 3];
                println!(
                    "Epoch {}: {:.2}% (avg cost: {:.4})",
                    record.epoch, record.accuracy, record.avg_cost
                );
            }
        }
    }
}
