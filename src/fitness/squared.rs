//! sum of squared byte differences, reduced in parallel with rayon.
//! every byte counts, alpha included, since buffers are premultiplied RGBA.
use rayon::prelude::*;

// below this many bytes per task the split overhead outweighs the work
const MIN_CHUNK_BYTES: usize = 256 * 1024;

#[inline]
fn chunk_squared_error(seed: &[u8], test: &[u8]) -> u64 {
    seed.iter()
        .zip(test)
        .map(|(&p1, &p2)| {
            let d = p1.abs_diff(p2) as u64;
            d * d
        })
        .sum()
}

/// Σ (test[i] - seed[i])² over all bytes. callers check lengths first.
pub fn squared_error(seed: &[u8], test: &[u8]) -> u64 {
    profiling::scope!("squared_error");
    debug_assert_eq!(seed.len(), test.len());

    let len = seed.len();
    if len == 0 {
        return 0;
    }

    let chunk_size = (len / rayon::current_num_threads()).max(MIN_CHUNK_BYTES);
    if chunk_size >= len {
        return chunk_squared_error(seed, test);
    }

    seed.par_chunks(chunk_size)
        .zip(test.par_chunks(chunk_size))
        .map(|(s, t)| chunk_squared_error(s, t))
        .sum()
}

/// `1 - err / (255² · bytes)`: 1.0 for identical images, towards 0.0 as
/// every byte diverges maximally
pub fn mean_squared_similarity(seed: &[u8], test: &[u8]) -> f64 {
    if seed.is_empty() {
        return 1.0;
    }
    let err = squared_error(seed, test);
    let max_err = 255u64 * 255 * seed.len() as u64;
    1.0 - (err as f64 / max_err as f64)
}
