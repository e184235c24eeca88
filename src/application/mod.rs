// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Coordinates the other layers; no tensor math and no
// argument parsing here.
//
//   melody.rs         — MelodyInference, the learn / infer
//                       lifecycle over any SequenceModel
//   train_use_case.rs — load table, learn, checkpoint, metrics
//   infer_use_case.rs — restore checkpoint, infer, write JSON
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// The framer + model + decoder adapter
pub mod melody;

// The training workflow
pub mod train_use_case;

// The inference workflow
pub mod infer_use_case;
