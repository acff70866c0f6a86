//! Injectable source of uniform random numbers.

use rand::{Rng, SeedableRng, rngs::StdRng};

/// Uniform random numbers in `[0, 1)`.
///
/// Every stochastic rule in the simulation draws through this trait so a
/// seeded source replays a run exactly.
pub trait RandomSource {
    /// Returns the next value in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// Uniform value in `[lo, hi)`.
    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + self.next_unit() * (hi - lo)
    }

    /// Bernoulli trial succeeding with probability `p`.
    fn chance(&mut self, p: f64) -> bool {
        self.next_unit() < p
    }

    /// Uniform index into a collection of `len` items (`len > 0`).
    fn pick_index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0);
        let idx = (self.next_unit() * len as f64) as usize;
        idx.min(len.saturating_sub(1))
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_unit(&mut self) -> f64 {
        (**self).next_unit()
    }
}

/// `StdRng`-backed source seeded from a `u64`.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    seed: u64,
    rng: StdRng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seeds from the OS generator; the chosen seed is kept for replay.
    pub fn from_entropy() -> Self {
        Self::new(rand::random::<u64>())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSource for SeededRandom {
    fn next_unit(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}
