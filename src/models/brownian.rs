// src/models/brownian.rs
//! Lazily Sampled Brownian Motion
//!
//! # Mathematical Framework
//!
//! A standard Wiener process W has `W(0) = 0` and independent increments
//! `W(t) - W(s) ~ N(0, t - s)`. Instead of simulating on a fixed grid, a
//! [`BrownianPath`] only draws values at the times it is asked about and
//! remembers them as checkpoints. A new query time `t` falls into one of two
//! cases:
//!
//! **Extension** beyond the last checkpoint `(t_n, v_n)`:
//! ```text
//! W(t) = v_n + √(t - t_n) * Z
//! ```
//!
//! **Brownian bridge** between adjacent checkpoints `(s₀, v₀)`, `(s₁, v₁)`:
//! ```text
//! mean     = ((s₁ - t) v₀ + (t - s₀) v₁) / (s₁ - s₀)
//! variance = (s₁ - t)(t - s₀) / (s₁ - s₀)
//! W(t)     = mean + √variance * Z
//! ```
//!
//! Together these make the joint law of any set of queried values that of a
//! single Wiener path, whatever order the times are queried in.

use super::model::Process;
use crate::error::{validation::*, SimResult};
use crate::rng;
use rand::rngs::StdRng;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Checkpoint {
    t: f64,
    v: f64,
}

/// One lazily revealed sample path of standard Brownian motion.
///
/// The path owns its random source. Checkpoints are kept sorted by time and
/// are never exposed; querying an existing time is a pure read.
#[derive(Debug, Clone)]
pub struct BrownianPath<R = StdRng> {
    checkpoints: Vec<Checkpoint>,
    rng: R,
}

impl BrownianPath<StdRng> {
    pub fn from_seed(seed: u64) -> Self {
        BrownianPath::new(rng::seed_rng_from_u64(seed))
    }
}

impl<R: Rng> BrownianPath<R> {
    pub fn new(rng: R) -> Self {
        BrownianPath {
            checkpoints: Vec::new(),
            rng,
        }
    }

    /// Number of distinct times fixed so far, the anchor included
    pub fn checkpoint_count(&self) -> usize {
        self.checkpoints.len()
    }

    fn extend(&mut self, last: Checkpoint, t: f64) -> f64 {
        let std_dev = (t - last.t).sqrt();
        last.v + std_dev * rng::get_normal_draw(&mut self.rng)
    }

    fn bridge(&mut self, left: Checkpoint, right: Checkpoint, t: f64) -> f64 {
        let (s0, v0) = (left.t, left.v);
        let (s1, v1) = (right.t, right.v);
        let span = s1 - s0;

        let mean = ((s1 - t) * v0 + (t - s0) * v1) / span;
        let variance = (s1 - t) * (t - s0) / span;
        mean + variance.sqrt() * rng::get_normal_draw(&mut self.rng)
    }
}

impl<R: Rng> Process for BrownianPath<R> {
    /// # Errors
    ///
    /// `InvalidArgument` for negative or non-finite `t`.
    fn at(&mut self, t: f64) -> SimResult<f64> {
        validate_non_negative("t", t)?;

        if self.checkpoints.is_empty() {
            self.checkpoints.push(Checkpoint { t: 0.0, v: 0.0 });
        }

        // First checkpoint at or after t; the anchor guarantees idx >= 1 for t > 0
        let idx = self.checkpoints.partition_point(|c| c.t < t);
        if let Some(hit) = self.checkpoints.get(idx) {
            if hit.t == t {
                return Ok(hit.v);
            }
        }

        let v = match self.checkpoints.get(idx) {
            None => {
                let last = self.checkpoints[idx - 1];
                self.extend(last, t)
            }
            Some(&right) => {
                let left = self.checkpoints[idx - 1];
                self.bridge(left, right, t)
            }
        };

        self.checkpoints.insert(idx, Checkpoint { t, v });
        Ok(v)
    }
}
