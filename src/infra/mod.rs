// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Persistence shared by the train and infer workflows:
//
//   checkpoint.rs — Saving and loading a trained adapter
//                   Network weights through Burn's
//                   CompactRecorder, plus a JSON snapshot of
//                   framing, pitch range, hyperparameters and
//                   network shape so inference rebuilds the
//                   identical model.
//
//   metrics.rs    — Training metrics logging
//                   Epoch-level losses and learning rate
//                   appended to a CSV file.
//
// Reference: Rust Book §7 (Modules)
//            Burn Book §5 (Checkpointing)

/// Adapter checkpoint saving and loading
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;
