// fitness laws comparing a rendered canvas to the seed image.
// both laws map to [0, 1], higher is better.

pub mod exact;
pub mod metrics;
pub mod squared;

pub use exact::exact_match_ratio;
pub use metrics::{psnr_from_mse, psnr_from_similarity};
pub use squared::{mean_squared_similarity, squared_error};

use serde::{Deserialize, Serialize};

use crate::error::{EvolveError, Result};

/// selectable scoring law
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FitnessStrategy {
    /// `1 - Σ(test - seed)² / (255² · bytes)`
    #[default]
    MeanSquaredSimilarity,
    /// fraction of bytes that match exactly
    ExactMatch,
}

impl FitnessStrategy {
    /// score `rendered` against `seed`. buffers of different length are a
    /// misconfigured renderer or settings and are rejected, never truncated.
    pub fn score(self, seed: &[u8], rendered: &[u8]) -> Result<f64> {
        profiling::scope!("FitnessStrategy::score");
        check_lengths(seed, rendered)?;
        Ok(match self {
            FitnessStrategy::MeanSquaredSimilarity => mean_squared_similarity(seed, rendered),
            FitnessStrategy::ExactMatch => exact_match_ratio(seed, rendered),
        })
    }
}

#[inline]
fn check_lengths(seed: &[u8], rendered: &[u8]) -> Result<()> {
    if seed.len() != rendered.len() {
        return Err(EvolveError::BufferMismatch { seed: seed.len(), rendered: rendered.len() });
    }
    Ok(())
}
