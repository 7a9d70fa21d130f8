//! Seeded shuffle-and-split into train and test index sets.

use rand::seq::SliceRandom;
use rand::Rng;

/// Shuffle `0..n` and cut off `ceil(n * test_fraction)` indices for testing.
///
/// Returns `(train, test)`. The test side is never empty for n >= 2 and a
/// positive fraction, and the train side is never empty for n >= 1.
pub fn train_test_split<R: Rng>(n: usize, test_fraction: f64, rng: &mut R) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);

    let fraction = test_fraction.clamp(0.0, 1.0);
    let mut n_test = (n as f64 * fraction).ceil() as usize;
    if n_test >= n {
        n_test = n.saturating_sub(1);
    }

    let train = indices.split_off(n_test);
    (train, indices)
}
