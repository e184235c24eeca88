// ============================================================
// Layer 4 — Cycle Batcher
// ============================================================
// Implements Burn's Batcher trait to stack a Vec<CycleSample>
// into observed/target tensors.
//
// How batching works here:
//   Input:  N samples, each a flat cycle_len x dim block
//   Output: CycleBatch with tensors of shape [N, cycle_len, dim]
//
//   The blocks are concatenated in order and reshaped:
//   [s1_c1_p1, ..., s1_cC_pD, s2_c1_p1, ..., sN_cC_pD] → [N, C, D]
//
// Every sample already has the same length (the framer never
// emits partial cycles), so no padding is needed.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::CycleSample;

// ─── CycleBatch ───────────────────────────────────────────────────────────────
/// A batch of cycles ready for the encoder/decoder forward pass.
#[derive(Debug, Clone)]
pub struct CycleBatch<B: Backend> {
    /// Input activity, shape: [batch_size, cycle_len, dim]
    pub observed: Tensor<B, 3>,

    /// Reconstruction target, shape: [batch_size, cycle_len, dim]
    pub target: Tensor<B, 3>,
}

// ─── CycleBatcher ─────────────────────────────────────────────────────────────
/// Knows the cycle shape so flat samples can be reshaped.
#[derive(Clone, Debug)]
pub struct CycleBatcher {
    pub cycle_len: usize,
    pub dim:       usize,
}

impl CycleBatcher {
    pub fn new(cycle_len: usize, dim: usize) -> Self {
        Self { cycle_len, dim }
    }
}

// ─── Burn Batcher Trait Implementation ────────────────────────────────────────
// The DataLoader calls .batch(items, device) with each mini-batch.
impl<B: Backend> Batcher<B, CycleSample, CycleBatch<B>> for CycleBatcher {
    fn batch(&self, items: Vec<CycleSample>, device: &B::Device) -> CycleBatch<B> {
        let shape = [items.len(), self.cycle_len, self.dim];

        let observed: Vec<f32> = items
            .iter()
            .flat_map(|s| s.observed.iter().copied())
            .collect();

        let target: Vec<f32> = items
            .into_iter()
            .flat_map(|s| s.target)
            .collect();

        CycleBatch {
            observed: Tensor::from_data(TensorData::new(observed, shape), device),
            target:   Tensor::from_data(TensorData::new(target, shape), device),
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    #[test]
    fn test_batch_shape_and_order() {
        let items = vec![
            CycleSample { observed: vec![1.0, 0.0, 0.0, 0.0], target: vec![1.0, 0.0, 0.0, 0.0] },
            CycleSample { observed: vec![0.0, 0.0, 0.0, 1.0], target: vec![0.0, 0.0, 0.0, 1.0] },
        ];
        let device = Default::default();
        let batch: CycleBatch<NdArray> = CycleBatcher::new(2, 2).batch(items, &device);

        assert_eq!(batch.observed.dims(), [2, 2, 2]);
        assert_eq!(batch.target.dims(),   [2, 2, 2]);

        let values = batch.observed.into_data().to_vec::<f32>().unwrap();
        assert_eq!(values, vec![1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
    }
}
