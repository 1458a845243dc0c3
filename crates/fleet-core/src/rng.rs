//! Injectable random source.
//!
//! Every stochastic component of the engine (route generation, jitter,
//! status draws, population generation, the movement model) draws from a
//! `SimRng` handed to it by the engine.  Seeding it makes whole runs
//! reproducible; tests rely on that.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Engine-level RNG.
///
/// Used only from the single execution context that owns the engine, so no
/// synchronisation is needed.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Seed from OS entropy.  Runs are not reproducible.
    pub fn from_entropy() -> Self {
        SimRng(SmallRng::from_entropy())
    }

    /// `Some(seed)` → deterministic, `None` → entropy.
    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(s) => Self::new(s),
            None    => Self::from_entropy(),
        }
    }

    #[inline]
    pub fn random<T>(&mut self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.0.r#gen()
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Uniform perturbation in `[-half, +half]`.  Returns `0.0` for `half <= 0`.
    #[inline]
    pub fn symmetric(&mut self, half: f64) -> f64 {
        if half > 0.0 {
            self.0.gen_range(-half..=half)
        } else {
            0.0
        }
    }

    /// Choose a random element from a slice.  `None` if the slice is empty.
    #[inline]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.0)
    }
}
