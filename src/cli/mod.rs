// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Two commands are supported:
//   1. `train`: learns from a note table and saves a checkpoint
//   2. `infer`: loads the checkpoint and predicts a melody
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, InferArgs, TrainArgs};

/// The main CLI struct; clap reads the fields and generates
/// argument parsing code via the Parser derive macro.
#[derive(Parser, Debug)]
#[command(
    name = "inferable-melody",
    version = "0.1.0",
    about = "Learn melodies from MIDI note tables with an LSTM encoder/decoder, then predict new ones."
)]
pub struct Cli {
    /// The subcommand to run (train or infer)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args) => run_train(args),
            Commands::Infer(args) => run_infer(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training on note table: {}", args.events.display());

    // CLI args → application config
    TrainUseCase::new(args.into()).execute()?;

    println!("Training complete. Checkpoint saved.");
    Ok(())
}

fn run_infer(args: InferArgs) -> Result<()> {
    use crate::application::infer_use_case::InferUseCase;

    let use_case = InferUseCase::new(&args.checkpoint_dir)?;
    let notes    = use_case.predict(&args.events)?;
    InferUseCase::write(&notes, args.output.as_ref())
}
