//! ChaCha-based classical random source.
//!
//! This is the last tier of the fallback chain and the source of every
//! non-bit draw in a run (bases, channel trials, metric jitter). It is
//! a statistical generator for simulation, not a key-grade CSPRNG.

use crate::bits::{Basis, BasisSequence, Bit, BitSequence};
use rand::Rng;
use rand_chacha::ChaCha20Rng;
use rand_core::{RngCore, SeedableRng};

/// Classical pseudo-random generator backed by ChaCha20.
///
/// Seeded from the OS entropy source by default. A fixed seed makes a
/// whole run reproducible, which the tests rely on.
#[derive(Debug, Clone)]
pub struct ClassicalRng {
    inner: ChaCha20Rng,
    /// Draw calls served since construction.
    draws: u64,
}

impl ClassicalRng {
    /// Creates a generator seeded from the OS entropy source.
    pub fn from_os_entropy() -> Self {
        let mut seed = [0u8; 32];
        rand_core::OsRng.fill_bytes(&mut seed);
        Self::from_seed(seed)
    }

    /// Creates a generator from a known seed.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            inner: ChaCha20Rng::from_seed(seed),
            draws: 0,
        }
    }

    /// Creates a generator from a small integer seed.
    pub fn seed_from_u64(seed: u64) -> Self {
        Self {
            inner: ChaCha20Rng::seed_from_u64(seed),
            draws: 0,
        }
    }

    /// Uniform independent bits.
    pub fn bits(&mut self, n: usize) -> BitSequence {
        self.draws += 1;
        (0..n).map(|_| Bit::from_bool(self.inner.gen::<bool>())).collect()
    }

    /// Independent bases, rectilinear or diagonal with equal probability.
    pub fn bases(&mut self, n: usize) -> BasisSequence {
        self.draws += 1;
        (0..n)
            .map(|_| Basis::from_bool(self.inner.gen::<bool>()))
            .collect()
    }

    /// Uniform draw in `[low, high)`. Returns `low` for an empty range.
    pub fn uniform(&mut self, low: f64, high: f64) -> f64 {
        self.draws += 1;
        if high <= low {
            return low;
        }
        self.inner.gen_range(low..high)
    }

    /// Uniform draw in `[0, 1)`.
    pub fn unit(&mut self) -> f64 {
        self.draws += 1;
        self.inner.gen::<f64>()
    }

    /// Returns the number of draw calls served.
    pub fn draw_count(&self) -> u64 {
        self.draws
    }
}

impl RngCore for ClassicalRng {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.inner.try_fill_bytes(dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lengths_match_request() {
        let mut rng = ClassicalRng::seed_from_u64(1);
        assert_eq!(rng.bits(17).len(), 17);
        assert_eq!(rng.bases(17).len(), 17);
        assert_eq!(rng.bits(17).lost_count(), 0);
    }

    #[test]
    fn test_same_seed_same_output() {
        let mut a = ClassicalRng::seed_from_u64(99);
        let mut b = ClassicalRng::seed_from_u64(99);
        assert_eq!(a.bits(64), b.bits(64));
        assert_eq!(a.bases(64), b.bases(64));
    }

    #[test]
    fn test_different_seed_different_output() {
        let mut a = ClassicalRng::seed_from_u64(1);
        let mut b = ClassicalRng::seed_from_u64(2);
        assert_ne!(a.bits(64), b.bits(64));
    }

    #[test]
    fn test_uniform_stays_in_range() {
        let mut rng = ClassicalRng::seed_from_u64(5);
        for _ in 0..1000 {
            let x = rng.uniform(50.0, 500.0);
            assert!((50.0..500.0).contains(&x));
        }
        assert_eq!(rng.uniform(3.0, 3.0), 3.0);
    }

    #[test]
    fn test_draw_count_tracking() {
        let mut rng = ClassicalRng::from_os_entropy();
        rng.bits(4);
        rng.bases(4);
        rng.unit();
        assert_eq!(rng.draw_count(), 3);
    }
}
