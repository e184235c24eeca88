// ============================================================
// Layer 4 — Activity Decoder
// ============================================================
// Converts predicted binary activity back into note events.
//
// For every sample s and step c:
//   window = [c * time_fraction, (c + 1) * time_fraction]
//   each index i with predicted[s, c, i] == 1 becomes
//   NoteEvent(min_pitch + i, window.start, window.end)
//
// Window times are offsets from the start of the sample, not
// absolute table times.
//
// A frame where every entry equals 1 is a saturated output
// (the usual sign of vanishing gradients) and fails the whole
// decode. An all-zero frame is silence and is accepted.

use crate::domain::activity::ActivityTensor;
use crate::domain::error::{MelodyError, Result};
use crate::domain::note::{NoteEvent, PitchRange};

pub struct Decoder {
    range:         PitchRange,
    time_fraction: f64,
}

impl Decoder {
    pub fn new(range: PitchRange, time_fraction: f64) -> Self {
        Self { range, time_fraction }
    }

    /// One ordered note list per sample: by step, then by pitch.
    pub fn decode(&self, predicted: &ActivityTensor) -> Result<Vec<Vec<NoteEvent>>> {
        if predicted.dim() != self.range.dim() {
            return Err(MelodyError::Model(format!(
                "predicted frame width {} does not match pitch range width {}",
                predicted.dim(),
                self.range.dim()
            )));
        }

        let mut samples = Vec::with_capacity(predicted.num_sequences());

        for sample in 0..predicted.num_sequences() {
            let mut notes = Vec::new();

            for step in 0..predicted.cycle_len() {
                let frame = predicted.frame(sample, step);
                if frame.iter().all(|&v| v == 1.0) {
                    return Err(MelodyError::DegeneratePrediction { sample, step });
                }

                let start = step as f64 * self.time_fraction;
                let end   = start + self.time_fraction;
                notes.extend(
                    frame
                        .iter()
                        .enumerate()
                        .filter(|(_, &v)| v == 1.0)
                        .map(|(i, _)| NoteEvent::new(self.range.pitch_at(i), start, end)),
                );
            }

            samples.push(notes);
        }

        Ok(samples)
    }
}
