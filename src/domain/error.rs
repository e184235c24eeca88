// ============================================================
// Layer 3 — Error Taxonomy
// ============================================================
// Every failure the framing / decoding core can report.
// Application and CLI layers wrap these in anyhow with context.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MelodyError>;

#[derive(Debug, Error)]
pub enum MelodyError {
    /// A hyperparameter or framing setting is out of range.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Inference was requested before any successful `learn`.
    #[error("Model has not been trained yet; call learn() first")]
    NotTrained,

    /// The trained pitch range and model are fixed once set.
    #[error("Model is already trained; its pitch range and handle are read-only")]
    AlreadyTrained,

    /// The model produced a saturated all-ones activity frame.
    #[error("Degenerate prediction at sample {sample}, step {step}: every pitch is active (vanishing gradients?)")]
    DegeneratePrediction { sample: usize, step: usize },

    /// Framing produced zero full cycles.
    #[error("Event table yields no complete cycle of activity frames")]
    EmptyDataset,

    #[error("Pitch {pitch} lies outside the trained range [{min}, {max}]")]
    PitchOutOfRange { pitch: u8, min: u8, max: u8 },

    #[error("Malformed event table: {0}")]
    Table(String),

    #[error("Model error: {0}")]
    Model(String),
}
