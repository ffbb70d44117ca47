// src/models/gbm.rs
use super::brownian::BrownianPath;
use super::model::Process;
use crate::error::{validation::*, SimResult};
use rand::rngs::StdRng;
use rand::Rng;

/// Geometric Brownian motion driven by a lazily sampled [`BrownianPath`]
///
/// # Formula
/// ```text
/// S(t) = scale * exp((drift - volatility/2) t + √volatility * W(t))
/// ```
/// `volatility` is the variance rate σ², so `E[S(t)] = scale * exp(drift t)`.
/// No randomness is drawn here; every value is a deterministic function of
/// the owned path at the same time.
#[derive(Debug, Clone)]
pub struct GeometricBrownianPath<R = StdRng> {
    pub scale: f64,
    pub drift: f64,
    pub volatility: f64,
    path: BrownianPath<R>,
}

impl GeometricBrownianPath<StdRng> {
    pub fn from_seed(scale: f64, drift: f64, volatility: f64, seed: u64) -> SimResult<Self> {
        Self::new(scale, drift, volatility, BrownianPath::from_seed(seed))
    }
}

impl<R: Rng> GeometricBrownianPath<R> {
    pub fn new(scale: f64, drift: f64, volatility: f64, path: BrownianPath<R>) -> SimResult<Self> {
        validate_finite("scale", scale)?;
        validate_finite("drift", drift)?;
        validate_non_negative("volatility", volatility)?;
        Ok(GeometricBrownianPath {
            scale,
            drift,
            volatility,
            path,
        })
    }

    /// Analytic mean `scale * exp(drift t)`
    pub fn expected_value(&self, t: f64) -> f64 {
        self.scale * (self.drift * t).exp()
    }

    /// The driving Brownian path
    pub fn underlying(&mut self) -> &mut BrownianPath<R> {
        &mut self.path
    }
}

impl<R: Rng> Process for GeometricBrownianPath<R> {
    fn at(&mut self, t: f64) -> SimResult<f64> {
        let w = self.path.at(t)?;
        let exponent = (self.drift - 0.5 * self.volatility) * t + self.volatility.sqrt() * w;
        Ok(self.scale * exponent.exp())
    }
}
