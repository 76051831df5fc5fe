//─────────────────────────────────────────────────────────────────────────────
// PSNR derived from the mean-squared similarity, for log output
//─────────────────────────────────────────────────────────────────────────────

const PEAK: f64 = 255.0;

/// PSNR (peak signal-to-noise ratio) in decibels.
/// higher is better. typical ranges:
///   - 30 dB = acceptable
///   - 35 dB = good
///   - 40+ dB = very good
#[inline]
pub fn psnr_from_mse(mse: f64, peak: f64) -> f64 {
    let mse = mse.max(1e-12);
    10.0 * ((peak * peak) / mse).log10()
}

/// per-byte MSE implied by a mean-squared similarity score
#[inline]
pub fn mse_from_similarity(similarity: f64) -> f64 {
    (1.0 - similarity).max(0.0) * PEAK * PEAK
}

/// only meaningful for `FitnessStrategy::MeanSquaredSimilarity` scores
#[inline]
pub fn psnr_from_similarity(similarity: f64) -> f64 {
    psnr_from_mse(mse_from_similarity(similarity), PEAK)
}
