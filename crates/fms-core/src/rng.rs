//! Seeded RNG used for initial-condition sampling.
//!
//! The spawning and reduction algorithms are fully deterministic and never
//! draw random numbers; randomness only enters when a driver jitters the
//! initial phase-space points of the basis.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use siphasher::sip::SipHasher13;
use std::hash::Hasher;

use crate::errors::{ErrorInfo, FmsError};

/// Gaussian sampler for phase-space jitter.
///
/// Each trajectory draws from its own substream, seeded by hashing
/// `(master_seed, trajectory_index)` with SipHash-1-3 under zero keys, so a
/// given master seed reproduces the same initial basis on every platform and
/// independently of how many trajectories are sampled.
#[derive(Debug, Clone)]
pub struct RngHandle {
    rng: StdRng,
}

impl RngHandle {
    /// Sampler seeded directly with `seed`.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Sampler for substream `stream` of `master_seed`.
    pub fn substream(master_seed: u64, stream: u64) -> Self {
        Self::from_seed(derive_substream_seed(master_seed, stream))
    }

    /// Draws one sample from `N(mean, sigma^2)`. A zero `sigma` returns `mean`;
    /// a negative or non-finite `sigma` is rejected.
    pub fn normal(&mut self, mean: f64, sigma: f64) -> Result<f64, FmsError> {
        let sigma_error = |message: String| {
            FmsError::Config(
                ErrorInfo::new("normal-sigma", message)
                    .with_context("sigma", sigma)
                    .with_hint("sampling widths must be finite and non-negative"),
            )
        };
        if !(sigma >= 0.0 && sigma.is_finite()) {
            return Err(sigma_error("standard deviation must be finite and non-negative".into()));
        }
        if sigma == 0.0 {
            return Ok(mean);
        }
        let dist = Normal::new(mean, sigma).map_err(|err| sigma_error(err.to_string()))?;
        Ok(dist.sample(&mut self.rng))
    }

    /// Jitters every coordinate of `centre` with the same `sigma`.
    pub fn jitter(&mut self, centre: &[f64], sigma: f64) -> Result<Vec<f64>, FmsError> {
        centre.iter().map(|&c| self.normal(c, sigma)).collect()
    }
}

/// Seed of substream `stream` under `master_seed`.
pub fn derive_substream_seed(master_seed: u64, stream: u64) -> u64 {
    let mut sip = SipHasher13::new_with_keys(0, 0);
    sip.write_u64(master_seed);
    sip.write_u64(stream);
    sip.finish()
}
