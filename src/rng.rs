// src/rng.rs
//! Random Number Generation for Simulations
//!
//! # Design Philosophy
//!
//! Every consumer in this crate (paths, trials, queues) takes any `rand::Rng`
//! and relies only on three primitives:
//! 1. **Uniform** draws on `[0, 1)`
//! 2. **Standard normal** draws via `rand_distr::StandardNormal`
//! 3. **Exponential** draws with a given rate, `Exp1 / rate`
//!
//! # Independent Streams
//!
//! A single generator must never be shared between concurrent trials.
//! [`RngFactory`] derives one reproducible `StdRng` per trial index so that
//! a parallel run produces the same numbers regardless of thread count:
//! ```text
//! stream_i = StdRng::seed_from_u64(base_seed + i)
//! ```

use crate::error::{validation::*, SimResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp1, StandardNormal};

/// RNG factory for reproducible per-trial streams
#[derive(Debug, Clone, Copy)]
pub struct RngFactory {
    base_seed: u64,
}

impl RngFactory {
    pub fn new(base_seed: u64) -> Self {
        Self { base_seed }
    }

    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }

    /// Create the stream owned by trial (or path) `stream_id`
    pub fn create_std_rng(&self, stream_id: u64) -> StdRng {
        StdRng::seed_from_u64(self.base_seed.wrapping_add(stream_id))
    }
}

pub fn seed_rng_from_u64(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

pub fn get_normal_draw<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    StandardNormal.sample(rng)
}

pub fn get_uniform_draw<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen::<f64>()
}

/// Exponential variate with the given rate (mean `1 / rate`).
///
/// The caller guarantees `rate > 0`; see [`exponential_checked`] for a
/// validating variant.
pub fn get_exponential_draw<R: Rng + ?Sized>(rng: &mut R, rate: f64) -> f64 {
    let e: f64 = Exp1.sample(rng);
    e / rate
}

pub fn exponential_checked<R: Rng + ?Sized>(rng: &mut R, rate: f64) -> SimResult<f64> {
    validate_positive("rate", rate)?;
    Ok(get_exponential_draw(rng, rate))
}

/// Arrival times of a Poisson process with intensity `rate`, up to and
/// including the first arrival at or after `horizon`.
///
/// A non-positive horizon still yields the first arrival, so the result is
/// never empty.
pub fn poisson_process<R: Rng + ?Sized>(
    rng: &mut R,
    rate: f64,
    horizon: f64,
) -> SimResult<Vec<f64>> {
    validate_positive("rate", rate)?;
    validate_finite("horizon", horizon)?;

    let mut arrivals = Vec::new();
    let mut t = 0.0;
    loop {
        t += get_exponential_draw(rng, rate);
        arrivals.push(t);
        if t >= horizon {
            break;
        }
    }
    Ok(arrivals)
}
