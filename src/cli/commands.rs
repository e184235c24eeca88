// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands: `train` and `infer`
// and all their configurable flags.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → usize, f64, enums)
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::application::train_use_case::TrainConfig;
use crate::domain::hyperparams::{FramingConfig, Hyperparameters, LossKind, OptimizerKind};

/// The two top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the encoder/decoder on a note table
    Train(TrainArgs),

    /// Predict a melody from a note table using a trained checkpoint
    Infer(InferArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptimizerArg {
    Adam,
    Sgd,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LossArg {
    /// Mean squared error
    Mse,
    /// Binary cross-entropy
    Bce,
}

impl From<OptimizerArg> for OptimizerKind {
    fn from(a: OptimizerArg) -> Self {
        match a {
            OptimizerArg::Adam => OptimizerKind::Adam,
            OptimizerArg::Sgd  => OptimizerKind::Sgd,
        }
    }
}

impl From<LossArg> for LossKind {
    fn from(a: LossArg) -> Self {
        match a {
            LossArg::Mse => LossKind::MeanSquaredError,
            LossArg::Bce => LossKind::BinaryCrossEntropy,
        }
    }
}

/// All arguments for the `train` command.
/// Each field becomes a --flag on the command line.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Note table to learn from (.csv or .json with pitch,start,end)
    #[arg(long)]
    pub events: PathBuf,

    /// Directory to save the checkpoint and metrics
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: PathBuf,

    /// Sampled instants per training sequence
    #[arg(long, default_value_t = 30)]
    pub cycle_len: usize,

    /// Seconds between sampled instants
    #[arg(long, default_value_t = 0.01)]
    pub time_fraction: f64,

    /// Width of the LSTM hidden state
    #[arg(long, default_value_t = 200)]
    pub hidden: usize,

    /// Number of full passes through the training data
    #[arg(long, default_value_t = 1000)]
    pub epochs: usize,

    #[arg(long, default_value_t = 50)]
    pub batch_size: usize,

    /// Initial learning rate
    #[arg(long, default_value_t = 1e-5)]
    pub lr: f64,

    /// Factor the learning rate is multiplied by at each decay step
    #[arg(long, default_value_t = 0.1)]
    pub lr_decay: f64,

    /// Epochs between learning-rate decay steps
    #[arg(long, default_value_t = 50)]
    pub decay_every: usize,

    /// Time steps per truncated-backpropagation window (0 = whole cycle)
    #[arg(long, default_value_t = 8)]
    pub bptt_tau: usize,

    /// Cap on each weight tensor's sum of squares, enforced every `decay-every` epochs
    #[arg(long, default_value_t = 0.5)]
    pub weight_limit: f64,

    /// Dropout probability applied to the LSTM outputs
    #[arg(long, default_value_t = 0.5)]
    pub dropout: f64,

    /// Share of cycles held out for validation
    #[arg(long, default_value_t = 0.3)]
    pub test_size: f64,

    #[arg(long, value_enum, default_value_t = OptimizerArg::Adam)]
    pub optimizer: OptimizerArg,

    #[arg(long, value_enum, default_value_t = LossArg::Mse)]
    pub loss: LossArg,

    /// Seed for the train/validation split and batch shuffling
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            events:          a.events,
            checkpoint_dir:  a.checkpoint_dir,
            framing:         FramingConfig::new(a.cycle_len, a.time_fraction),
            hyperparameters: Hyperparameters {
                hidden_neuron_count:     a.hidden,
                epochs:                  a.epochs,
                batch_size:              a.batch_size,
                learning_rate:           a.lr,
                learning_attenuate_rate: a.lr_decay,
                attenuate_epoch:         a.decay_every,
                bptt_tau:                a.bptt_tau,
                weight_limit:            a.weight_limit,
                dropout_rate:            a.dropout,
                test_size_rate:          a.test_size,
                optimizer:               a.optimizer.into(),
                loss:                    a.loss.into(),
                seed:                    a.seed,
            },
        }
    }
}

/// All arguments for the `infer` command
#[derive(Args, Debug)]
pub struct InferArgs {
    /// Note table to continue from
    #[arg(long)]
    pub events: PathBuf,

    /// Directory where the checkpoint was saved during training
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: PathBuf,

    /// Where to write the predicted notes as JSON (stdout if omitted)
    #[arg(long)]
    pub output: Option<PathBuf>,
}
