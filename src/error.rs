// src/error.rs
use std::fmt;

/// Error types for the lazy-sde library
#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    /// Caller-supplied argument outside its valid domain
    InvalidArgument { parameter: String, reason: String },

    /// Singular regression, non-finite trial output, or similar numerical breakdown
    NumericalError { method: String, reason: String },

    /// An iterative method ran out of budget before meeting its tolerance
    NonConvergence {
        method: String,
        iterations: usize,
        reason: String,
    },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::InvalidArgument { parameter, reason } => {
                write!(f, "Invalid argument '{}': {}", parameter, reason)
            }
            SimError::NumericalError { method, reason } => {
                write!(f, "Numerical error in {}: {}", method, reason)
            }
            SimError::NonConvergence {
                method,
                iterations,
                reason,
            } => {
                write!(
                    f,
                    "{} did not converge after {} iterations: {}",
                    method, iterations, reason
                )
            }
        }
    }
}

impl std::error::Error for SimError {}

/// Result type alias for lazy-sde operations
pub type SimResult<T> = Result<T, SimError>;

/// Validation utilities
pub mod validation {
    use super::{SimError, SimResult};

    fn invalid(name: &str, reason: String) -> SimError {
        SimError::InvalidArgument {
            parameter: name.to_string(),
            reason,
        }
    }

    /// Validate that a value is finite and not NaN
    pub fn validate_finite(name: &str, value: f64) -> SimResult<()> {
        if !value.is_finite() {
            Err(invalid(
                name,
                format!("must be finite (not NaN or infinite), got {}", value),
            ))
        } else {
            Ok(())
        }
    }

    /// Validate that a value is finite and non-negative
    pub fn validate_non_negative(name: &str, value: f64) -> SimResult<()> {
        validate_finite(name, value)?;
        if value < 0.0 {
            Err(invalid(
                name,
                format!("must be non-negative (≥ 0), got {}", value),
            ))
        } else {
            Ok(())
        }
    }

    /// Validate that a value is finite and strictly positive
    pub fn validate_positive(name: &str, value: f64) -> SimResult<()> {
        validate_finite(name, value)?;
        if value <= 0.0 {
            Err(invalid(name, format!("must be positive (> 0), got {}", value)))
        } else {
            Ok(())
        }
    }

    /// Validate a probability in the closed interval [0, 1]
    pub fn validate_probability(name: &str, p: f64) -> SimResult<()> {
        if !(0.0..=1.0).contains(&p) {
            Err(invalid(name, format!("must be in [0, 1], got {}", p)))
        } else {
            Ok(())
        }
    }

    /// Validate a two-sided significance level in the open interval (0, 1)
    pub fn validate_significance(name: &str, alpha: f64) -> SimResult<()> {
        if !(alpha > 0.0 && alpha < 1.0) {
            Err(invalid(name, format!("must be in (0, 1), got {}", alpha)))
        } else {
            Ok(())
        }
    }

    /// Validate the number of Monte Carlo trials
    pub fn validate_trials(trials: usize) -> SimResult<()> {
        if trials <= 1 {
            Err(invalid(
                "trials",
                format!("must be greater than 1, got {}", trials),
            ))
        } else {
            Ok(())
        }
    }
}
