//! Injectable randomness.
//!
//! Every random draw in the engine (tier sampling, participant shuffling,
//! synthetic persona fields, fallback reactions) goes through a
//! [`RandomSource`]. Seeding it makes a whole run reproducible.

use std::sync::Arc;

use parking_lot::Mutex;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// A cheaply clonable handle to one shared ChaCha8 generator.
///
/// Clones draw from the same stream. The lock is never held across an
/// `.await`.
#[derive(Debug, Clone)]
pub struct RandomSource {
    rng: Arc<Mutex<ChaCha8Rng>>,
}

impl RandomSource {
    /// Deterministic source for the given seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Arc::new(Mutex::new(ChaCha8Rng::seed_from_u64(seed))),
        }
    }

    /// Source seeded from the thread-local OS-backed generator.
    pub fn from_entropy() -> Self {
        Self::seeded(rand::random())
    }

    /// Seeded when `seed` is set, entropy otherwise.
    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::seeded)
    }

    /// Run `f` with exclusive access to the generator.
    pub fn with<T>(&self, f: impl FnOnce(&mut ChaCha8Rng) -> T) -> T {
        let mut rng = self.rng.lock();
        f(&mut *rng)
    }

    /// Uniform integer in `[low, high]`.
    pub fn range_inclusive(&self, low: usize, high: usize) -> usize {
        self.with(|rng| rng.gen_range(low..=high))
    }

    /// Uniform float in `[0, 1)`.
    pub fn unit(&self) -> f64 {
        self.with(|rng| rng.gen::<f64>())
    }

    /// Uniform float in `[low, high)`.
    pub fn uniform(&self, low: f64, high: f64) -> f64 {
        low + self.unit() * (high - low)
    }

    /// Pick one element uniformly. `None` only for an empty slice.
    pub fn choose<'a, T>(&self, items: &'a [T]) -> Option<&'a T> {
        self.with(|rng| items.choose(rng))
    }

    /// Uniform random permutation in place.
    pub fn shuffle<T>(&self, items: &mut [T]) {
        self.with(|rng| items.shuffle(rng));
    }
}

impl Default for RandomSource {
    fn default() -> Self {
        Self::from_entropy()
    }
}
