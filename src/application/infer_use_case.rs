// ============================================================
// Layer 2 — Infer Use Case
// ============================================================
//   1. Restore the trained adapter from the checkpoint dir
//   2. Load the note table to continue from
//   3. Frame with the trained pitch range, predict, decode
//   4. Write the per-sample note lists as JSON

use anyhow::{Context, Result};
use std::{fs, io::Write, path::PathBuf};

use crate::application::melody::MelodyInference;
use crate::data::loader::EventTableLoader;
use crate::domain::note::NoteEvent;
use crate::domain::traits::EventSource;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::inferencer::{DefaultSequenceModel, TrainBackend};

pub struct InferUseCase {
    adapter: MelodyInference<DefaultSequenceModel>,
}

impl InferUseCase {
    pub fn new(checkpoint_dir: impl Into<PathBuf>) -> Result<Self> {
        let ckpt    = CheckpointManager::open(checkpoint_dir.into())?;
        let adapter = ckpt.load::<TrainBackend>()?;
        Ok(Self { adapter })
    }

    pub fn predict(&self, events: impl Into<PathBuf>) -> Result<Vec<Vec<NoteEvent>>> {
        let events = events.into();
        let table  = EventTableLoader::new(&events).load_table()?;
        self.adapter
            .inferance(&table)
            .with_context(|| format!("Inference on '{}' failed", events.display()))
    }

    /// Pretty JSON to `output`, or stdout when none is given.
    pub fn write(notes: &[Vec<NoteEvent>], output: Option<&PathBuf>) -> Result<()> {
        let json = serde_json::to_string_pretty(notes)?;
        match output {
            Some(path) => {
                fs::write(path, json)
                    .with_context(|| format!("Cannot write '{}'", path.display()))?;
                tracing::info!("Predicted melody written to '{}'", path.display());
            }
            None => {
                let mut out = std::io::stdout().lock();
                writeln!(out, "{json}")?;
            }
        }
        Ok(())
    }
}
