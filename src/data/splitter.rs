// ============================================================
// Layer 4 — Train / Hold-out Splitter
// ============================================================
// Shuffles labeled calls and splits them into a training set and
// a hold-out set used to report accuracy after training.
//
// The caller passes the RNG so a seeded run always produces the
// same split.

use rand::seq::SliceRandom;
use rand::Rng;

/// Shuffle `samples` and split into (train, hold-out).
///
/// # Arguments
/// * `samples`        - All available samples (consumed by this function)
/// * `train_fraction` - Proportion kept for training, e.g. 0.8 = 80%
/// * `rng`            - Source of randomness for the shuffle
pub fn split_train_holdout<T, R: Rng + ?Sized>(
    mut samples:    Vec<T>,
    train_fraction: f64,
    rng:            &mut R,
) -> (Vec<T>, Vec<T>) {
    samples.shuffle(rng);

    let total    = samples.len();
    let split_at = ((total as f64) * train_fraction.clamp(0.0, 1.0)).round() as usize;
    let split_at = split_at.min(total);

    let holdout = samples.split_off(split_at);

    tracing::debug!(
        "Dataset split: {} training, {} hold-out",
        samples.len(),
        holdout.len(),
    );

    (samples, holdout)
}
