// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// The Burn-specific code behind the SequenceModel seam.
// The domain and data-framing code never touch these types;
// the application layer only sees SequenceModel.
//
//   model.rs      — LSTM encoder/decoder
//                   • encoder LSTM over activity frames
//                   • decoder LSTM seeded with the encoder state
//                   • linear projection back to frame width
//                   • sigmoid activation probabilities
//                   • MSE / binary cross-entropy loss
//
//   trainer.rs    — The training loop
//                   Seeded train/validation split, truncated
//                   BPTT windows, weight-norm cap,
//                   step learning-rate decay, per-epoch metrics
//
//   inferencer.rs — BurnSequenceModel
//                   configure / train / infer for the adapter,
//                   thresholding probabilities at 0.5
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)
//            Hochreiter & Schmidhuber (1997) Long Short-Term Memory

/// LSTM encoder/decoder architecture and loss
pub mod model;

/// Training loop with validation and metrics
pub mod trainer;

/// SequenceModel implementation over the Burn network
pub mod inferencer;
