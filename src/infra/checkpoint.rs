// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores a trained MelodyInference adapter.
//
// What gets saved:
//   1. Network weights (model.mpk.gz): all learned LSTM/linear
//      parameters, via Burn's CompactRecorder
//   2. melody.json: everything needed to rebuild the adapter
//      around those weights:
//        • framing (cycle_len, time_fraction)
//        • pitch range captured at training
//        • hyperparameters
//        • network config (widths, dropout)
//        • number of epochs trained
//
// Inference must frame with the exact pitch range and framing
// used in training, and the weights only load into a network
// of identical shape, so melody.json is written alongside
// every weight file.
//
// Directory layout:
//   checkpoints/
//     model.mpk.gz
//     melody.json
//     metrics.csv      (MetricsLogger)
//
// Reference: Burn Book §5 (Records and Checkpointing)
//            Rust Book §9 (Error Handling)

use anyhow::{anyhow, bail, Context, Result};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
    tensor::backend::AutodiffBackend,
};
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}};

use crate::application::melody::MelodyInference;
use crate::domain::hyperparams::{FramingConfig, Hyperparameters};
use crate::domain::note::PitchRange;
use crate::ml::inferencer::BurnSequenceModel;
use crate::ml::model::EncoderDecoderConfig;

const WEIGHTS_FILE:  &str = "model";
const SNAPSHOT_FILE: &str = "melody.json";

/// Everything except the weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MelodySnapshot {
    pub framing:         FramingConfig,
    pub pitch_range:     PitchRange,
    pub hyperparameters: Hyperparameters,
    pub network:         EncoderDecoderConfig,
    pub epochs_trained:  usize,
}

/// Manages saving and loading of checkpoints in one directory.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Creates the directory if it doesn't already exist.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create checkpoint dir '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    /// Read-only access to an existing directory; nothing is created.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.is_dir() {
            bail!(
                "Checkpoint dir '{}' does not exist. Have you trained the model first?",
                dir.display()
            );
        }
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save weights and snapshot of a trained adapter.
    pub fn save<B: AutodiffBackend>(
        &self,
        adapter: &MelodyInference<BurnSequenceModel<B>>,
    ) -> Result<()> {
        let (model, pitch_range) = adapter
            .model()
            .zip(adapter.pitch_range())
            .ok_or_else(|| anyhow!("Cannot checkpoint an untrained model"))?;

        // Recorder adds the .mpk.gz extension
        let path = self.dir.join(WEIGHTS_FILE);
        CompactRecorder::new()
            .record(model.network().clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save weights to '{}'", path.display()))?;

        self.save_snapshot(&MelodySnapshot {
            framing:         adapter.framing(),
            pitch_range,
            hyperparameters: model.hyperparameters().clone(),
            network:         model.config().clone(),
            epochs_trained:  model.history().len(),
        })?;

        tracing::info!("Checkpoint saved to '{}'", self.dir.display());
        Ok(())
    }

    /// Rebuild a trained adapter from the directory.
    pub fn load<B: AutodiffBackend>(&self) -> Result<MelodyInference<BurnSequenceModel<B>>> {
        let snapshot = self.load_snapshot()?;
        let device   = B::Device::default();

        let path   = self.dir.join(WEIGHTS_FILE);
        let record = CompactRecorder::new()
            .load(path.clone(), &device)
            .with_context(|| {
                format!("Cannot load weights '{}'. Have you trained the model first?",
                    path.display())
            })?;
        let network = snapshot.network.init::<B>(&device).load_record(record);

        tracing::info!(
            "Loaded checkpoint: pitches {}..={}, {} epochs trained",
            snapshot.pitch_range.min, snapshot.pitch_range.max, snapshot.epochs_trained
        );

        let model = BurnSequenceModel::from_parts(
            network,
            snapshot.network,
            snapshot.hyperparameters,
            device,
        );
        Ok(MelodyInference::restore(snapshot.framing, snapshot.pitch_range, model)?)
    }

    pub fn save_snapshot(&self, snapshot: &MelodySnapshot) -> Result<()> {
        let path = self.dir.join(SNAPSHOT_FILE);
        let json = serde_json::to_string_pretty(snapshot)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write '{}'", path.display()))?;
        tracing::debug!("Saved snapshot to '{}'", path.display());
        Ok(())
    }

    pub fn load_snapshot(&self) -> Result<MelodySnapshot> {
        let path = self.dir.join(SNAPSHOT_FILE);
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read '{}'. Make sure you have run 'train' before 'infer'.",
                path.display()
            )
        })?;
        serde_json::from_str(&json)
            .with_context(|| format!("Corrupt snapshot '{}'", path.display()))
    }
}
