use rayon::prelude::*;

/// fraction of byte positions holding the same value in both buffers.
/// callers check lengths first.
pub fn exact_match_ratio(seed: &[u8], test: &[u8]) -> f64 {
    profiling::scope!("exact_match_ratio");
    debug_assert_eq!(seed.len(), test.len());
    if seed.is_empty() {
        return 1.0;
    }
    let same = seed.par_iter().zip(test.par_iter()).filter(|(a, b)| a == b).count();
    same as f64 / seed.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_equal_bytes() {
        assert_eq!(exact_match_ratio(&[1, 2, 3, 4], &[1, 0, 3, 0]), 0.5);
        assert_eq!(exact_match_ratio(&[9; 10], &[8; 10]), 0.0);
    }
}
