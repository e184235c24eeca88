// ============================================================
// Layer 3 — Activity Tensor
// ============================================================
// Shape [num_sequences, cycle_len, dim], stored row-major:
//
//   values[(s * cycle_len + c) * dim + i]
//
// Entry (s, c, i) is 1.0 when pitch `min_pitch + i` sounds at
// step c of sequence s, 0.0 otherwise. Kept free of burn types
// so framing and decoding can be tested without a backend; the
// ml layer converts to and from burn tensors at its boundary.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityTensor {
    num_sequences: usize,
    cycle_len:     usize,
    dim:           usize,
    values:        Vec<f32>,
}

impl ActivityTensor {
    /// All-zero tensor of the given shape.
    pub fn zeros(num_sequences: usize, cycle_len: usize, dim: usize) -> Self {
        Self {
            num_sequences,
            cycle_len,
            dim,
            values: vec![0.0; num_sequences * cycle_len * dim],
        }
    }

    /// Wrap flat row-major values. Returns `None` when the length
    /// does not match the shape.
    pub fn from_vec(
        num_sequences: usize,
        cycle_len:     usize,
        dim:           usize,
        values:        Vec<f32>,
    ) -> Option<Self> {
        (values.len() == num_sequences * cycle_len * dim).then_some(Self {
            num_sequences,
            cycle_len,
            dim,
            values,
        })
    }

    /// Stack whole cycles, each a `cycle_len x dim` flat block.
    pub(crate) fn from_cycles(cycles: Vec<Vec<f32>>, cycle_len: usize, dim: usize) -> Self {
        let num_sequences = cycles.len();
        let values: Vec<f32> = cycles.into_iter().flatten().collect();
        debug_assert_eq!(values.len(), num_sequences * cycle_len * dim);
        Self { num_sequences, cycle_len, dim, values }
    }

    pub fn shape(&self) -> [usize; 3] {
        [self.num_sequences, self.cycle_len, self.dim]
    }

    pub fn num_sequences(&self) -> usize {
        self.num_sequences
    }

    pub fn cycle_len(&self) -> usize {
        self.cycle_len
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn is_empty(&self) -> bool {
        self.num_sequences == 0
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn get(&self, sequence: usize, step: usize, index: usize) -> f32 {
        self.values[(sequence * self.cycle_len + step) * self.dim + index]
    }

    /// The activity vector at one `(sequence, step)`.
    pub fn frame(&self, sequence: usize, step: usize) -> &[f32] {
        let at = (sequence * self.cycle_len + step) * self.dim;
        &self.values[at..at + self.dim]
    }

    /// One whole sequence as a flat `cycle_len x dim` slice.
    pub fn sequence(&self, sequence: usize) -> &[f32] {
        let len = self.cycle_len * self.dim;
        &self.values[sequence * len..(sequence + 1) * len]
    }

    /// Missing or NaN readings count as silence.
    pub fn sanitize(&mut self) {
        for v in self.values.iter_mut().filter(|v| !v.is_finite()) {
            *v = 0.0;
        }
    }
}
