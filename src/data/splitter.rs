// ============================================================
// Layer 4 — Train/Validation Splitter
// ============================================================
// Shuffles cycles with a seeded RNG and splits them into:
//   - Training set:   used to update model weights
//   - Validation set: used only to report held-out loss
//
// The split is reproducible: the same seed and the same input
// always give the same partition.
//
// The training side keeps at least one sample whenever the
// input is non-empty, so a high test_size on a short table
// still trains. The validation side may be empty.
//
// Uses Fisher-Yates shuffle via rand::seq::SliceRandom.
//
// Reference: Rust Book §8 (Vectors)
//            rand crate documentation

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

/// Shuffle `samples` with `seed` and split into (train, validation).
///
/// `train_fraction` is the share kept for training, e.g. 0.7.
pub fn split_train_val<T>(
    mut samples:    Vec<T>,
    train_fraction: f64,
    seed:           u64,
) -> (Vec<T>, Vec<T>) {
    let mut rng = StdRng::seed_from_u64(seed);
    samples.shuffle(&mut rng);

    let total    = samples.len();
    let split_at = ((total as f64) * train_fraction).round() as usize;
    let split_at = split_at.clamp(total.min(1), total);

    // samples = [0..split_at], val = [split_at..total]
    let val = samples.split_off(split_at);

    tracing::debug!(
        "Dataset split: {} training, {} validation (seed {})",
        samples.len(),
        val.len(),
        seed,
    );

    (samples, val)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correct_split_sizes() {
        let items: Vec<usize> = (0..100).collect();
        let (train, val)      = split_train_val(items, 0.7, 42);
        assert_eq!(train.len(), 70);
        assert_eq!(val.len(),   30);
    }

    #[test]
    fn test_all_items_preserved() {
        let items: Vec<usize> = (0..50).collect();
        let (train, val)      = split_train_val(items, 0.7, 1);

        let mut all: Vec<usize> = train.into_iter().chain(val).collect();
        all.sort_unstable();
        assert_eq!(all, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_same_seed_same_partition() {
        let a = split_train_val((0..20).collect::<Vec<usize>>(), 0.5, 7);
        let b = split_train_val((0..20).collect::<Vec<usize>>(), 0.5, 7);
        assert_eq!(a, b);
    }

    #[test]
    fn test_single_sample_stays_in_training() {
        let (train, val) = split_train_val(vec![1usize], 0.3, 42);
        assert_eq!(train, vec![1]);
        assert!(val.is_empty());
    }

    #[test]
    fn test_empty_dataset() {
        let items: Vec<usize> = Vec::new();
        let (train, val)      = split_train_val(items, 0.8, 42);
        assert!(train.is_empty());
        assert!(val.is_empty());
    }
}
