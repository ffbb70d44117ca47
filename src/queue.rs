// src/queue.rs
//! M/M/c Queue
//!
//! Poisson arrivals at rate λ, exponential service at rate μ per busy server,
//! and `c` servers. From a state with `N` customers, the next event comes
//! from competing exponential clocks:
//! ```text
//! arrival   ~ Exp(λ)
//! departure ~ min over min(N, c) busy servers of Exp(μ)
//! ```
//! Whichever fires first moves the occupancy by +1 or -1.

use crate::error::{validation::*, SimError, SimResult};
use crate::rng;
use rand::rngs::StdRng;
use rand::Rng;
use std::fmt;

/// Number of customers in the system from time `t` onwards
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QueueState {
    pub t: f64,
    pub n: usize,
}

impl fmt::Display for QueueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.2}, {}]", self.t, self.n)
    }
}

#[derive(Debug, Clone)]
pub struct MmcQueue<R = StdRng> {
    pub arrival_rate: f64,
    pub service_rate: f64,
    pub servers: usize,
    states: Vec<QueueState>,
    rng: R,
}

impl MmcQueue<StdRng> {
    pub fn from_seed(
        arrival_rate: f64,
        service_rate: f64,
        servers: usize,
        seed: u64,
    ) -> SimResult<Self> {
        Self::new(rng::seed_rng_from_u64(seed), arrival_rate, service_rate, servers)
    }
}

impl<R: Rng> MmcQueue<R> {
    /// An empty queue at time zero
    pub fn new(rng: R, arrival_rate: f64, service_rate: f64, servers: usize) -> SimResult<Self> {
        validate_positive("arrival_rate", arrival_rate)?;
        validate_positive("service_rate", service_rate)?;
        if servers == 0 {
            return Err(SimError::InvalidArgument {
                parameter: "servers".to_string(),
                reason: "a queue needs at least one server".to_string(),
            });
        }
        Ok(MmcQueue {
            arrival_rate,
            service_rate,
            servers,
            states: vec![QueueState { t: 0.0, n: 0 }],
            rng,
        })
    }

    fn current(&self) -> QueueState {
        // states starts with the initial state and only grows
        self.states[self.states.len() - 1]
    }

    /// Simulate the next arrival or departure and record it
    pub fn advance(&mut self) -> QueueState {
        let current = self.current();

        let mut wait = rng::get_exponential_draw(&mut self.rng, self.arrival_rate);
        let mut arrival = true;

        let in_service = current.n.min(self.servers);
        for _ in 0..in_service {
            let service = rng::get_exponential_draw(&mut self.rng, self.service_rate);
            if service < wait {
                wait = service;
                arrival = false;
            }
        }

        let next = QueueState {
            t: current.t + wait,
            n: if arrival { current.n + 1 } else { current.n - 1 },
        };
        self.states.push(next);
        next
    }

    /// Advance until the most recent event is at or after `horizon`
    pub fn simulate_until(&mut self, horizon: f64) -> SimResult<()> {
        validate_finite("horizon", horizon)?;
        while self.current().t < horizon {
            self.advance();
        }
        Ok(())
    }

    /// Every recorded state, in time order, starting with `(0, 0)`
    pub fn history(&self) -> &[QueueState] {
        &self.states
    }
}

impl<R> fmt::Display for MmcQueue<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, state) in self.states.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", state)?;
        }
        Ok(())
    }
}
