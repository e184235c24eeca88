// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records training metrics to a CSV file, one row per epoch.
//
// Metrics recorded per epoch:
//   - epoch:         the epoch number (1, 2, 3, ...)
//   - train_loss:    mean reconstruction loss over training windows
//   - val_loss:      mean reconstruction loss on held-out cycles
//                    (NaN when the validation split is empty)
//   - learning_rate: the attenuated rate used for that epoch
//
// Output file: checkpoints/metrics.csv
//
// Example CSV output:
//   epoch,train_loss,val_loss,learning_rate
//   1,0.251300,0.249800,0.00001
//   2,0.233000,0.236100,0.00001
//   ...
//
// Rows are appended, so several runs against the same
// checkpoint directory accumulate in one file.
//
// Reference: csv crate documentation (serde serialisation)
//            Rust Book §9 (Error Handling)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
};

/// One row of metrics data for a single training epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// The epoch number (starts at 1)
    pub epoch: usize,

    /// Average loss over all training windows of the epoch
    pub train_loss: f64,

    /// Average loss on the validation set
    pub val_loss: f64,

    pub learning_rate: f64,
}

impl EpochMetrics {
    pub fn new(epoch: usize, train_loss: f64, val_loss: f64, learning_rate: f64) -> Self {
        Self { epoch, train_loss, val_loss, learning_rate }
    }
}

/// Logs epoch metrics to a CSV file for later analysis.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create the directory if needed; the header is written only
    /// when the file is new.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create '{}'", dir.display()))?;

        let csv_path = dir.join("metrics.csv");
        if !csv_path.exists() {
            let mut writer = csv::Writer::from_path(&csv_path)
                .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
            writer.write_record(["epoch", "train_loss", "val_loss", "learning_rate"])?;
            writer.flush()?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append rows for every given epoch.
    pub fn log_all(&self, history: &[EpochMetrics]) -> Result<()> {
        let file = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        for m in history {
            writer.serialize(m)?;
        }
        writer.flush()?;

        tracing::debug!(
            "Logged {} epochs to '{}'",
            history.len(),
            self.csv_path.display()
        );
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}
