// src/mc/control_variate.rs
//! Control Variate Regression
//!
//! # Mathematical Framework
//!
//! Given responses `yᵢ` and control covariates `xᵢ ∈ ℝᵈ`, the optimal linear
//! adjustment is the OLS slope of `y` on the centred controls:
//! ```text
//! Sx[j,k] = Σᵢ (xᵢⱼ - x̄ⱼ)(xᵢₖ - x̄ₖ) / (N - 1)
//! Sxy[j]  = Σᵢ (xᵢⱼ - x̄ⱼ)(yᵢ - ȳ) / (N - 1)
//! b       = Sx⁻¹ Sxy
//! y'ᵢ     = yᵢ - b · (xᵢ - x̄)
//! ```
//! The adjusted responses keep the mean of `y` while their sample variance
//! shrinks to `(1 - R²) Var(y)`. For `d = 1` this is the familiar
//! `(1 - ρ²) Var(y)`.
//!
//! When the true control expectations `μ` are known, centring on them
//! instead of `x̄` also corrects the point estimate:
//! ```text
//! y'ᵢ = yᵢ - b · (xᵢ - μ)
//! ```

use crate::error::{SimError, SimResult};
use nalgebra::{DMatrix, DVector};

/// Sample covariance structure of one simulation's controls and responses
#[derive(Debug, Clone)]
pub struct CovarianceModel {
    pub control_means: DVector<f64>,
    pub response_mean: f64,
    pub sx: DMatrix<f64>,
    pub sxy: DVector<f64>,
    pub coefficients: DVector<f64>,
    /// Point the controls are centred on when adjusting; `x̄` unless
    /// replaced by known expectations
    centre: DVector<f64>,
}

impl CovarianceModel {
    /// Fit the regression of `ys` on the rows of `xs`.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for fewer than two observations, mismatched
    ///   lengths, or ragged/empty control rows
    /// - `NumericalError` when `Sx` is singular or its condition number
    ///   exceeds `max_condition_number`
    pub fn fit(ys: &[f64], xs: &[Vec<f64>], max_condition_number: f64) -> SimResult<Self> {
        let n = ys.len();
        if n < 2 || xs.len() != n {
            return Err(SimError::InvalidArgument {
                parameter: "xs".to_string(),
                reason: format!(
                    "need at least 2 paired observations, got {} responses and {} control rows",
                    n,
                    xs.len()
                ),
            });
        }
        let d = xs[0].len();
        if d == 0 {
            return Err(SimError::InvalidArgument {
                parameter: "xs".to_string(),
                reason: "control rows are empty".to_string(),
            });
        }
        if let Some((i, row)) = xs.iter().enumerate().find(|(_, row)| row.len() != d) {
            return Err(SimError::InvalidArgument {
                parameter: "xs".to_string(),
                reason: format!(
                    "trial {} reported {} controls, expected {}",
                    i,
                    row.len(),
                    d
                ),
            });
        }

        let nf = n as f64;
        let response_mean = ys.iter().sum::<f64>() / nf;
        let control_means =
            DVector::from_fn(d, |j, _| xs.iter().map(|row| row[j]).sum::<f64>() / nf);

        let sx = DMatrix::from_fn(d, d, |j, k| {
            xs.iter()
                .map(|row| (row[j] - control_means[j]) * (row[k] - control_means[k]))
                .sum::<f64>()
                / (nf - 1.0)
        });
        let sxy = DVector::from_fn(d, |j, _| {
            xs.iter()
                .zip(ys)
                .map(|(row, y)| (row[j] - control_means[j]) * (y - response_mean))
                .sum::<f64>()
                / (nf - 1.0)
        });

        let coefficients = solve_regression(&sx, &sxy, max_condition_number)?;

        Ok(CovarianceModel {
            centre: control_means.clone(),
            control_means,
            response_mean,
            sx,
            sxy,
            coefficients,
        })
    }

    pub fn dimension(&self) -> usize {
        self.coefficients.len()
    }

    /// Centre the adjustment on known control expectations
    pub fn centred_on(mut self, expectations: &[f64]) -> SimResult<Self> {
        if expectations.len() != self.dimension() {
            return Err(SimError::InvalidArgument {
                parameter: "known_control_means".to_string(),
                reason: format!(
                    "expected {} control expectations, got {}",
                    self.dimension(),
                    expectations.len()
                ),
            });
        }
        self.centre = DVector::from_vec(expectations.to_vec());
        Ok(self)
    }

    /// `y - b · (x - c)` for one observation, `c` being the centre
    pub fn adjust_one(&self, y: f64, x: &[f64]) -> f64 {
        let offset: f64 = x
            .iter()
            .zip(self.centre.iter())
            .zip(self.coefficients.iter())
            .map(|((xj, cj), bj)| bj * (xj - cj))
            .sum();
        y - offset
    }

    pub fn adjust(&self, ys: &[f64], xs: &[Vec<f64>]) -> Vec<f64> {
        ys.iter()
            .zip(xs)
            .map(|(&y, x)| self.adjust_one(y, x))
            .collect()
    }
}

fn solve_regression(
    sx: &DMatrix<f64>,
    sxy: &DVector<f64>,
    max_condition_number: f64,
) -> SimResult<DVector<f64>> {
    let singular = |reason: String| SimError::NumericalError {
        method: "Control variate regression".to_string(),
        reason,
    };

    let svd = sx.clone().svd(false, false);
    let (s_min, s_max) = svd
        .singular_values
        .iter()
        .fold((f64::INFINITY, 0.0f64), |(lo, hi), &s| (lo.min(s), hi.max(s)));

    if !s_max.is_finite() || s_max <= 0.0 {
        return Err(singular(format!(
            "control covariance matrix is degenerate (largest singular value {})",
            s_max
        )));
    }
    let condition = s_max / s_min;
    if !(condition <= max_condition_number) {
        return Err(singular(format!(
            "control covariance matrix is ill-conditioned (condition number {:.3e} > {:.3e})",
            condition, max_condition_number
        )));
    }

    let b = sx
        .clone()
        .lu()
        .solve(sxy)
        .ok_or_else(|| singular("control covariance matrix is singular".to_string()))?;

    if b.iter().any(|v| !v.is_finite()) {
        return Err(singular(format!(
            "regression coefficients are not finite: {:?}",
            b.as_slice()
        )));
    }
    Ok(b)
}
