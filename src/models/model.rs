// src/models/model.rs
use crate::error::SimResult;

/// A continuous-time process whose sample path is revealed lazily, one
/// query time at a time.
pub trait Process {
    /// Value of the sample path at time `t ≥ 0`.
    ///
    /// Repeated queries for the same `t` return the same value.
    fn at(&mut self, t: f64) -> SimResult<f64>;

    /// Query every time in `times`, in the given order
    fn sample(&mut self, times: &[f64]) -> SimResult<Vec<f64>> {
        times.iter().map(|&t| self.at(t)).collect()
    }
}
