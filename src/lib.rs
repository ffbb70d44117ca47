//! # lazy-sde: Lazy Brownian Paths and Monte Carlo Estimation
//!
//! A Rust library for sampling continuous-time stochastic processes at
//! arbitrary times, estimating expectations by Monte Carlo with confidence
//! intervals, and inverting distribution functions numerically.
//!
//! ## Key Features
//!
//! - **Lazy Brownian Paths**: Query `W(t)` in any order; earlier answers are
//!   remembered and later ones stay consistent via the Brownian bridge
//! - **Geometric Brownian Motion**: Exponential transform of a lazy path
//! - **Monte Carlo Engine**: Normal-approximation intervals, optional
//!   control variates, sequential or parallel (Rayon) trials
//! - **CDF Inversion**: Quantiles of any CDF, including ones defined only by
//!   a density, by bracketing and bisection
//! - **M/M/c Queue**: Event-driven multi-server queue on exponential clocks
//!
//! ## Quick Start
//!
//! ```rust
//! use lazy_sde::{BrownianPath, MonteCarlo, Process};
//!
//! // E[W(1)²] = 1, one fresh path per trial
//! let mut seed = 0u64;
//! let mut mc = MonteCarlo::new(|| {
//!     seed += 1;
//!     let mut w = BrownianPath::from_seed(seed);
//!     let x = w.at(1.0).expect("non-negative time");
//!     x * x
//! });
//! let estimate = mc.simulate(10_000, 0.05).unwrap();
//! assert!((estimate.value - 1.0).abs() < 0.1);
//! ```
//!
//! Trials that can fail are collected first and then estimated:
//!
//! ```rust
//! use lazy_sde::mc::mc_engine::{estimate_from_samples, McConfig};
//! use lazy_sde::models::gbm::GeometricBrownianPath;
//! use lazy_sde::models::model::Process;
//!
//! let samples = (0..2_000u64)
//!     .map(|seed| GeometricBrownianPath::from_seed(1.0, 0.05, 0.04, seed)?.at(1.0))
//!     .collect::<Result<Vec<f64>, _>>()
//!     .expect("valid parameters");
//! let estimate = estimate_from_samples(&samples, 0.05, &McConfig::default()).unwrap();
//! println!("E[S(1)] ≈ {}", estimate);
//! ```
//!
//! ## Mathematical Foundation
//!
//! Every process is driven by a single Brownian path that is sampled only
//! where it is queried. New times beyond the last sample extend the path by
//! an independent Gaussian increment; times between two samples are drawn
//! from the Brownian bridge, so the joint law of all answers is that of one
//! Brownian motion regardless of query order.

// Module declarations
pub mod error;
pub mod math_utils;
pub mod mc;
pub mod models;
pub mod numerics;
pub mod output;
pub mod queue;
pub mod rng;

// Re-export commonly used types for convenience
pub use error::{SimError, SimResult};
pub use mc::estimate::{Estimate, Outcome};
pub use mc::mc_engine::{McConfig, MonteCarlo};
pub use models::brownian::BrownianPath;
pub use models::gbm::GeometricBrownianPath;
pub use models::model::Process;
pub use numerics::inversion::InversionConfig;
