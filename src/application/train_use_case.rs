// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load the note table        (Layer 4 - data)
//   Step 2: Learn from it              (Layer 2 - adapter)
//             frame → configure → train
//   Step 3: Save config for reference  (Layer 6 - infra)
//   Step 4: Save checkpoint            (Layer 6 - infra)
//   Step 5: Append epoch metrics       (Layer 6 - infra)
//
// Reference: Burn Book §5 (Training)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::application::melody::MelodyInference;
use crate::data::loader::EventTableLoader;
use crate::domain::hyperparams::{FramingConfig, Hyperparameters};
use crate::domain::traits::EventSource;
use crate::infra::{checkpoint::CheckpointManager, metrics::MetricsLogger};
use crate::ml::inferencer::DefaultSequenceModel;

// ─── Training Configuration ──────────────────────────────────────────────────
// Everything one training run needs.
// Serialisable so the effective settings are kept next to the checkpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub events:          PathBuf,
    pub checkpoint_dir:  PathBuf,
    pub framing:         FramingConfig,
    pub hyperparameters: Hyperparameters,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            events:          PathBuf::from("data/notes.csv"),
            checkpoint_dir:  PathBuf::from("checkpoints"),
            framing:         FramingConfig::default(),
            hyperparameters: Hyperparameters::default(),
        }
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<()> {
        let cfg = &self.config;

        // ── Step 1: Load the note table ───────────────────────────────────────
        let table = EventTableLoader::new(&cfg.events).load_table()?;

        // ── Step 2: Frame, configure and train ────────────────────────────────
        let mut adapter = MelodyInference::<DefaultSequenceModel>::new(cfg.framing);
        adapter
            .learn(&table, &cfg.hyperparameters)
            .with_context(|| format!("Training on '{}' failed", cfg.events.display()))?;

        // ── Step 3: Save config ───────────────────────────────────────────────
        let ckpt = CheckpointManager::new(&cfg.checkpoint_dir)?;
        let path = ckpt.dir().join("train_config.json");
        fs::write(&path, serde_json::to_string_pretty(cfg)?)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        // ── Step 4: Save checkpoint ───────────────────────────────────────────
        ckpt.save(&adapter)?;

        // ── Step 5: Metrics ───────────────────────────────────────────────────
        if let Some(model) = adapter.model() {
            let logger = MetricsLogger::new(&cfg.checkpoint_dir)?;
            logger.log_all(model.history())?;
            tracing::info!("Metrics written to '{}'", logger.csv_path().display());
        }

        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_round_trips_through_json() {
        let cfg  = TrainConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: TrainConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.framing,         cfg.framing);
        assert_eq!(back.hyperparameters, cfg.hyperparameters);
        assert_eq!(back.events,          cfg.events);
    }

    #[test]
    fn test_missing_event_file_fails_before_training() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = TrainConfig {
            events:         dir.path().join("absent.csv"),
            checkpoint_dir: dir.path().join("ckpt"),
            ..TrainConfig::default()
        };
        assert!(TrainUseCase::new(cfg).execute().is_err());
    }

    #[test]
    fn test_execute_writes_checkpoint_and_metrics() {
        let dir    = tempfile::tempdir().unwrap();
        let events = dir.path().join("notes.csv");
        fs::write(
            &events,
            "pitch,start,end\n60,0.0,1.0\n62,1.0,2.0\n64,2.0,3.0\n65,3.0,4.0\n",
        )
        .unwrap();

        let cfg = TrainConfig {
            events,
            checkpoint_dir:  dir.path().join("ckpt"),
            framing:         FramingConfig::new(2, 0.5),
            hyperparameters: Hyperparameters {
                hidden_neuron_count: 4,
                epochs:              2,
                batch_size:          2,
                learning_rate:       0.01,
                dropout_rate:        0.0,
                ..Hyperparameters::default()
            },
        };
        TrainUseCase::new(cfg.clone()).execute().unwrap();

        let ckpt = cfg.checkpoint_dir;
        assert!(ckpt.join("melody.json").exists());
        assert!(ckpt.join("train_config.json").exists());

        let mut reader = csv::Reader::from_path(ckpt.join("metrics.csv")).unwrap();
        assert_eq!(reader.records().count(), 2);
    }
}
