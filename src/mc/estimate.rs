// src/mc/estimate.rs
//! Trial outcomes and interval estimates

use std::fmt;

/// What one trial reports: the response of interest plus optional control
/// covariates. Every trial of one simulation must report the same number of
/// controls.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub response: f64,
    pub controls: Vec<f64>,
}

impl Outcome {
    pub fn new(response: f64) -> Self {
        Outcome {
            response,
            controls: Vec::new(),
        }
    }

    pub fn with_controls(response: f64, controls: Vec<f64>) -> Self {
        Outcome { response, controls }
    }
}

impl From<f64> for Outcome {
    fn from(response: f64) -> Self {
        Outcome::new(response)
    }
}

impl From<(f64, Vec<f64>)> for Outcome {
    fn from((response, controls): (f64, Vec<f64>)) -> Self {
        Outcome::with_controls(response, controls)
    }
}

impl From<(f64, f64)> for Outcome {
    fn from((response, control): (f64, f64)) -> Self {
        Outcome::with_controls(response, vec![control])
    }
}

/// A point estimate with a confidence interval
/// `[value - lower_offset, value + upper_offset]`.
///
/// The offsets need not be equal, although the normal-approximation
/// interval built by the Monte Carlo engine is symmetric.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Estimate {
    pub value: f64,
    /// Coverage probability `1 - alpha`
    pub confidence_level: f64,
    pub lower_offset: f64,
    pub upper_offset: f64,
}

impl Estimate {
    pub fn symmetric(value: f64, confidence_level: f64, half_width: f64) -> Self {
        Estimate {
            value,
            confidence_level,
            lower_offset: half_width,
            upper_offset: half_width,
        }
    }

    /// Two-sided significance level
    pub fn alpha(&self) -> f64 {
        1.0 - self.confidence_level
    }

    pub fn lower(&self) -> f64 {
        self.value - self.lower_offset
    }

    pub fn upper(&self) -> f64 {
        self.value + self.upper_offset
    }

    pub fn width(&self) -> f64 {
        self.lower_offset + self.upper_offset
    }

    pub fn half_width(&self) -> f64 {
        0.5 * self.width()
    }

    pub fn contains(&self, x: f64) -> bool {
        self.lower() <= x && x <= self.upper()
    }
}

impl fmt::Display for Estimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = 100.0 * self.confidence_level;
        if self.lower_offset == self.upper_offset {
            write!(
                f,
                "{:.6} ± {:.6} ({:.1}% CI)",
                self.value, self.upper_offset, level
            )
        } else {
            write!(
                f,
                "{:.6} [{:.6}, {:.6}] ({:.1}% CI)",
                self.value,
                self.lower(),
                self.upper(),
                level
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_interval_bounds() {
        let e = Estimate {
            value: 1.0,
            confidence_level: 0.9,
            lower_offset: 0.2,
            upper_offset: 0.5,
        };
        assert_abs_diff_eq!(e.lower(), 0.8, epsilon = 1e-12);
        assert_abs_diff_eq!(e.upper(), 1.5, epsilon = 1e-12);
        assert_abs_diff_eq!(e.half_width(), 0.35, epsilon = 1e-12);
        assert_abs_diff_eq!(e.alpha(), 0.1, epsilon = 1e-15);
        assert!(e.contains(1.4));
        assert!(!e.contains(0.7));
    }

    #[test]
    fn test_display() {
        let e = Estimate::symmetric(0.5, 0.95, 0.031);
        let s = e.to_string();
        assert!(s.contains("0.500000 ± 0.031000"));
        assert!(s.contains("95.0% CI"));

        let e = Estimate {
            lower_offset: 0.1,
            ..e
        };
        assert!(e.to_string().contains("[0.400000, 0.531000]"));
    }

    #[test]
    fn test_outcome_conversions() {
        let o: Outcome = 2.0_f64.into();
        assert!(o.controls.is_empty());

        let o: Outcome = (2.0_f64, vec![1.0, 3.0]).into();
        assert_eq!(o.controls, vec![1.0, 3.0]);

        let o: Outcome = (2.0_f64, 4.0_f64).into();
        assert_eq!(o, Outcome::with_controls(2.0, vec![4.0]));
    }
}
