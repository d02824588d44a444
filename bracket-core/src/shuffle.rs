//! Shufflers - the randomness source used to seed a bracket
//!
//! The engine never reaches for a global RNG. Production code uses
//! [`RngShuffler`]; tests plug in [`IdentityShuffler`] to get exact pairings.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::candidate::Candidate;

/// Produces a permutation of the initial candidate list
pub trait Shuffler {
    fn shuffle(&mut self, candidates: &mut [Candidate]);
}

/// Fair Fisher-Yates shuffle over any `rand` generator
#[derive(Clone, Debug)]
pub struct RngShuffler<R: Rng = ChaCha8Rng> {
    rng: R,
}

impl RngShuffler<ChaCha8Rng> {
    /// Seed from OS entropy
    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    /// Reproducible shuffles for a given seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Seeded when `seed` is set, entropy otherwise
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }
}

impl<R: Rng> RngShuffler<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl Default for RngShuffler<ChaCha8Rng> {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl<R: Rng> Shuffler for RngShuffler<R> {
    fn shuffle(&mut self, candidates: &mut [Candidate]) {
        candidates.shuffle(&mut self.rng);
    }
}

/// Keeps the supplied order
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityShuffler;

impl Shuffler for IdentityShuffler {
    fn shuffle(&mut self, _candidates: &mut [Candidate]) {}
}

impl<F> Shuffler for F
where
    F: FnMut(&mut [Candidate]),
{
    fn shuffle(&mut self, candidates: &mut [Candidate]) {
        self(candidates)
    }
}
