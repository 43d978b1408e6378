//! Injectable random sources for bounded score variation.
//!
//! Every computation that adds jitter takes a `&mut dyn JitterSource`, so
//! callers decide per computation whether the variation is seeded
//! (reproducible), drawn from entropy, or switched off entirely.

use rand::rngs::StdRng;
use rand::{Rng as _, SeedableRng as _};

/// Source of uniform samples in `[0, 1)`.
pub trait JitterSource {
    /// Returns the next sample.
    fn next_unit(&mut self) -> f64;

    /// Maps the next sample onto `[-half_width, half_width)`.
    fn symmetric(&mut self, half_width: f64) -> f64 {
        (self.next_unit() - 0.5) * 2.0 * half_width
    }
}

/// Jitter backed by a [`StdRng`].
#[derive(Debug, Clone)]
pub struct SeededJitter {
    rng: StdRng,
}

impl SeededJitter {
    /// Deterministic jitter: the same seed always yields the same sequence.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Non-reproducible jitter seeded from the operating system.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Seeded when `seed` is set, entropy otherwise.
    #[must_use]
    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::from_seed)
    }
}

impl JitterSource for SeededJitter {
    fn next_unit(&mut self) -> f64 {
        self.rng.r#gen::<f64>()
    }
}

/// Always returns the midpoint, so every symmetric variation is zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoJitter;

impl JitterSource for NoJitter {
    fn next_unit(&mut self) -> f64 {
        0.5
    }
}
