use catmatch_core::FusionWeights;

/// Combine a reference score and a name score into one average similarity.
///
/// Both present: weighted sum. One present: that score unchanged. Neither: `0.0`.
/// The result is clamped to `[0, 1]`; policy weights only sum to 1 within a
/// small tolerance.
#[must_use]
pub fn fuse(reference: Option<f64>, name: Option<f64>, weights: FusionWeights) -> f64 {
    match (reference, name) {
        (Some(r), Some(n)) => (r * weights.reference + n * weights.name).clamp(0.0, 1.0),
        (Some(score), None) | (None, Some(score)) => score,
        (None, None) => 0.0,
    }
}
