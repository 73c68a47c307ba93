//! # Seeded PRNG
//!
//! A single deterministic random source, threaded through every generator
//! decision (spec §4.1). No generator may reach for randomness outside this
//! type — that's what makes a seeded run reproducible bit-for-bit.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Deterministic random source used by every generator.
///
/// Wraps `rand::rngs::StdRng` so every call site goes through one narrow
/// API instead of reaching for `rand::thread_rng()`.
#[derive(Debug, Clone)]
pub struct DungeonRng {
    inner: StdRng,
}

impl DungeonRng {
    /// Seeds from an explicit value. Two `DungeonRng`s built from the same
    /// seed produce byte-identical sequences.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }

    /// Seeds from OS entropy, for callers that did not pin a seed.
    pub fn from_entropy() -> Self {
        Self {
            inner: StdRng::from_entropy(),
        }
    }

    /// Uniform integer in `[lo, hi)`.
    pub fn range_i32(&mut self, lo: i32, hi: i32) -> i32 {
        assert!(lo < hi, "empty range [{lo}, {hi})");
        self.inner.gen_range(lo..hi)
    }

    /// Uniform integer in `[lo, hi)`, as `u32`.
    pub fn range_u32(&mut self, lo: u32, hi: u32) -> u32 {
        assert!(lo < hi, "empty range [{lo}, {hi})");
        self.inner.gen_range(lo..hi)
    }

    /// Uniform integer in the inclusive range `[lo, hi]`.
    pub fn range_inclusive_u32(&mut self, lo: u32, hi: u32) -> u32 {
        assert!(lo <= hi, "empty inclusive range [{lo}, {hi}]");
        self.inner.gen_range(lo..=hi)
    }

    /// Uniform double in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }

    /// Boolean via threshold comparison on a uniform double: `true` with
    /// probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Picks a uniformly random element of a non-empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        let idx = self.range_u32(0, items.len() as u32) as usize;
        &items[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = DungeonRng::from_seed(42);
        let mut b = DungeonRng::from_seed(42);
        for _ in 0..50 {
            assert_eq!(a.range_u32(0, 1000), b.range_u32(0, 1000));
            assert_eq!(a.next_f64(), b.next_f64());
        }
    }

    #[test]
    fn range_bounds_are_respected() {
        let mut rng = DungeonRng::from_seed(7);
        for _ in 0..1000 {
            let v = rng.range_i32(-5, 5);
            assert!((-5..5).contains(&v));
        }
    }

    #[test]
    fn chance_zero_never_true_one_always_true() {
        let mut rng = DungeonRng::from_seed(1);
        for _ in 0..100 {
            assert!(!rng.chance(0.0));
            assert!(rng.chance(1.0));
        }
    }
}
