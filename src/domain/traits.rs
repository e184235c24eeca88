// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The two seams of the system:
//
//   EventSource    — anything that yields a parsed note table
//                    (CSV file, JSON file, an in-memory fixture)
//   SequenceModel  — the opaque sequence-to-sequence learner.
//                    The adapter only ever configures, trains
//                    and queries it; the burn LSTM lives behind
//                    this trait in the ml layer, and tests plug
//                    in identity or fixed-pattern stubs.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result as AnyResult;

use crate::domain::activity::ActivityTensor;
use crate::domain::error::Result;
use crate::domain::hyperparams::Hyperparameters;
use crate::domain::note::EventTable;

// ─── EventSource ──────────────────────────────────────────────────────────────
/// Any component that can provide a note-event table.
///
/// Implementations:
///   - EventTableLoader → reads a .csv or .json file
pub trait EventSource {
    fn load_table(&self) -> AnyResult<EventTable>;
}

// ─── Topology ─────────────────────────────────────────────────────────────────
/// Layer widths of the encoder/decoder pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Topology {
    /// Width of each activity frame (input and reconstructed output)
    pub observed_dim: usize,
    /// Width of the recurrent hidden state
    pub hidden_dim: usize,
}

impl Topology {
    pub fn new(observed_dim: usize, hyper: &Hyperparameters) -> Self {
        Self { observed_dim, hidden_dim: hyper.hidden_neuron_count }
    }
}

// ─── SequenceModel ────────────────────────────────────────────────────────────
/// An opaque sequence-to-sequence model over activity tensors.
///
/// Input and output tensors share the shape
/// `[num_sequences, cycle_len, observed_dim]`. `infer` must
/// return binary indicators (exactly 0.0 or 1.0).
pub trait SequenceModel: Sized {
    /// Build an untrained model for the given layer widths.
    fn configure(topology: Topology, hyper: &Hyperparameters) -> Result<Self>;

    /// Fit the model so that `observed` maps onto `target`.
    fn train(&mut self, observed: &ActivityTensor, target: &ActivityTensor) -> Result<()>;

    /// Predict binary activity for each input sequence.
    fn infer(&self, observed: &ActivityTensor) -> Result<ActivityTensor>;
}
