use burn::data::dataset::Dataset;

use crate::domain::activity::ActivityTensor;

/// One cycle: `cycle_len x dim` observed frames and their target.
#[derive(Debug, Clone)]
pub struct CycleSample {
    pub observed: Vec<f32>,
    pub target:   Vec<f32>,
}

pub struct CycleDataset {
    samples: Vec<CycleSample>,
}

impl CycleDataset {
    pub fn new(samples: Vec<CycleSample>) -> Self { Self { samples } }

    /// Pair every observed sequence with the matching target sequence.
    pub fn samples_from(observed: &ActivityTensor, target: &ActivityTensor) -> Vec<CycleSample> {
        (0..observed.num_sequences())
            .map(|s| CycleSample {
                observed: observed.sequence(s).to_vec(),
                target:   target.sequence(s).to_vec(),
            })
            .collect()
    }
}

impl Dataset<CycleSample> for CycleDataset {
    fn get(&self, index: usize) -> Option<CycleSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
