// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types and traits that define the core concepts:
// notes, pitch ranges, activity tensors, configuration and the
// error taxonomy.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits

// Note events, event tables and pitch ranges
pub mod note;

// The [sequences, cycle_len, dim] binary activity tensor
pub mod activity;

// Framing settings and model hyperparameters
pub mod hyperparams;

// Error taxonomy shared by every layer below the CLI
pub mod error;

// Core abstractions (traits) that other layers implement
pub mod traits;
