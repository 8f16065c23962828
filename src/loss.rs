//! Loss used for both reporting and training.
//!
//! Training minimises the per-sample squared error
//! `E = 0.5 * sum_i (pred_i - target_i)^2`. Its derivative with respect to each
//! prediction is `pred_i - target_i`, which is what the output layer's delta
//! is built from.

/// Squared error `0.5 * sum((pred - target)^2)`.
///
/// Shape contract: `pred.len() == target.len()`.
#[inline]
pub fn squared_error(pred: &[f32], target: &[f32]) -> f32 {
    assert_eq!(
        pred.len(),
        target.len(),
        "pred len {} does not match target len {}",
        pred.len(),
        target.len()
    );

    let mut sum_sq = 0.0_f32;
    for (&p, &t) in pred.iter().zip(target) {
        let diff = p - t;
        sum_sq = diff.mul_add(diff, sum_sq);
    }
    0.5 * sum_sq
}
