// ============================================================
// Layer 4 — Dataset Framer
// ============================================================
// Turns a note table into fixed-length cycles of binary
// pitch-activity frames.
//
// How framing works:
//   1. The timeline runs from the earliest note start to the
//      latest note end, sampled every `time_fraction`
//      (both ends included).
//   2. At each sampled instant t, every note with
//      start <= t <= end sets its pitch bit in a frame of
//      width dim = max_pitch - min_pitch + 1.
//   3. Frames are packed into consecutive, non-overlapping
//      cycles of exactly `cycle_len` frames. A trailing partial
//      cycle is dropped, never padded.
//
// Example with time_fraction = 0.01, cycle_len = 2, dim = 3:
//   Notes:   (60, 0.00, 0.02)  (62, 0.01, 0.04)
//   t=0.00 → [1,0,0]   t=0.01 → [1,0,1]  ← cycle 0
//   t=0.02 → [1,0,1]   t=0.03 → [0,0,1]  ← cycle 1
//   t=0.04 → [0,0,1]                     ← dropped
//
// The instant of step k is start + k * time_fraction rather
// than a running sum, so long tables do not drift.
//
// Reference: Rust Book §8 (Vectors), §13 (Iterators)

use crate::domain::activity::ActivityTensor;
use crate::domain::error::{MelodyError, Result};
use crate::domain::hyperparams::FramingConfig;
use crate::domain::note::{EventTable, PitchRange};

pub struct Framer {
    range:   PitchRange,
    framing: FramingConfig,
}

impl Framer {
    /// Fails with a configuration error when `time_fraction <= 0`
    /// or `cycle_len == 0`; either would never terminate.
    pub fn new(range: PitchRange, framing: FramingConfig) -> Result<Self> {
        framing.validate()?;
        Ok(Self { range, framing })
    }

    /// Observed tensor of shape `[num_sequences, cycle_len, dim]`.
    ///
    /// An empty table, or one whose time span is inverted, yields
    /// zero sequences; callers decide whether that is an error.
    /// An infinite start or end has no finite timeline and fails
    /// with a table error.
    pub fn frame(&self, table: &EventTable) -> Result<ActivityTensor> {
        let dim       = self.range.dim();
        let cycle_len = self.framing.cycle_len;
        let step      = self.framing.time_fraction;

        let Some((start_t, end_t)) = table.time_span() else {
            return Ok(ActivityTensor::zeros(0, cycle_len, dim));
        };
        if start_t.is_infinite() || end_t.is_infinite() {
            return Err(MelodyError::Table(format!(
                "time span [{start_t}, {end_t}] is not finite"
            )));
        }
        // Also catches NaN bounds
        if !(start_t <= end_t) {
            return Ok(ActivityTensor::zeros(0, cycle_len, dim));
        }

        let mut cycles  = Vec::new();
        let mut current = Vec::with_capacity(cycle_len * dim);
        let mut k: u64  = 0;

        loop {
            let t = start_t + k as f64 * step;
            if t > end_t {
                break;
            }

            let mut frame = vec![0.0f32; dim];
            for event in table.events().iter().filter(|e| e.is_active_at(t)) {
                let index = self.range.index_of(event.pitch).ok_or(
                    MelodyError::PitchOutOfRange {
                        pitch: event.pitch,
                        min:   self.range.min,
                        max:   self.range.max,
                    },
                )?;
                frame[index] = 1.0;
            }
            current.extend_from_slice(&frame);

            if current.len() == cycle_len * dim {
                cycles.push(std::mem::replace(
                    &mut current,
                    Vec::with_capacity(cycle_len * dim),
                ));
            }
            k += 1;
        }

        let dropped = current.len() / dim;
        if dropped > 0 {
            tracing::debug!("Dropped {} trailing frames (< cycle_len {})", dropped, cycle_len);
        }

        let mut observed = ActivityTensor::from_cycles(cycles, cycle_len, dim);
        observed.sanitize();
        tracing::debug!(
            "Framed {} events into {} cycles ({} sampled instants)",
            table.len(), observed.num_sequences(), k
        );
        Ok(observed)
    }

    /// Observed tensor plus its autoencoding target (a value copy).
    pub fn frame_with_target(&self, table: &EventTable) -> Result<(ActivityTensor, ActivityTensor)> {
        let observed = self.frame(table)?;
        let target   = observed.clone();
        Ok((observed, target))
    }
}
