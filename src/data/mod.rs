// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between a note table on disk and tensor batches,
// plus the way back from predicted activity to notes.
//
//   notes.csv / notes.json
//       │
//       ▼
//   EventTableLoader  → reads rows, checks times
//       │
//       ▼
//   Framer            → samples the timeline into binary frames,
//       │               packs frames into cycles
//       ▼
//   CycleDataset      → implements Burn's Dataset trait
//       │
//       ▼
//   CycleBatcher      → stacks cycles into [batch, cycle, dim]
//       │
//       ▼
//   DataLoader        → feeds batches to the training loop
//
//   predicted activity
//       │
//       ▼
//   Decoder           → active indices back into NoteEvents
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Reads note tables from .csv or .json
pub mod loader;

/// Samples note tables into fixed-length activity cycles
pub mod framer;

/// Turns predicted activity back into note events
pub mod decoder;

/// Implements Burn's Dataset trait for cycles
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Shuffles and splits cycles into train/validation sets
pub mod splitter;
