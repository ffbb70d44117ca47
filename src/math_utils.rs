// src/math_utils.rs
//! Density functions handed to the quadrature and inversion machinery.

use statrs::function::{erf, gamma};
use std::f64::consts::{PI, SQRT_2};

/// Closed-form standard normal CDF, used as a reference for the
/// quadrature-backed CDFs.
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf::erf(x / SQRT_2))
}

/// Density of N(mu, sigma²)
///
/// # Formula
/// ```text
/// φ(x) = 1/(σ√(2π)) * exp(-(x-μ)²/(2σ²))
/// ```
pub fn normal_pdf(mu: f64, sigma: f64) -> impl Fn(f64) -> f64 + Clone + Send + Sync {
    let coef = 1.0 / ((2.0 * PI).sqrt() * sigma);
    let two_var = 2.0 * sigma * sigma;
    move |x| coef * (-(x - mu) * (x - mu) / two_var).exp()
}

/// Density of Student's t-distribution with `dof` degrees of freedom
///
/// # Formula
/// ```text
/// f(x) = Γ((ν+1)/2) / (√(νπ) Γ(ν/2)) * (1 + x²/ν)^(-(ν+1)/2)
/// ```
/// The normalising constant is computed in log space to stay finite for
/// large ν.
pub fn student_t_pdf(dof: u32) -> impl Fn(f64) -> f64 + Clone + Send + Sync {
    let nu = dof as f64;
    let ln_coef =
        gamma::ln_gamma((nu + 1.0) / 2.0) - gamma::ln_gamma(nu / 2.0) - 0.5 * (nu * PI).ln();
    let coef = ln_coef.exp();
    let exponent = -(nu + 1.0) / 2.0;
    move |x| coef * (1.0 + x * x / nu).powf(exponent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_normal_pdf_peak() {
        let pdf = normal_pdf(0.0, 1.0);
        assert_abs_diff_eq!(pdf(0.0), 0.398_942_280_4, epsilon = 1e-9);
        assert_abs_diff_eq!(pdf(1.0), pdf(-1.0), epsilon = 1e-15);

        let shifted = normal_pdf(3.0, 2.0);
        assert_abs_diff_eq!(shifted(3.0), 0.398_942_280_4 / 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_student_t_one_dof_is_cauchy() {
        let pdf = student_t_pdf(1);
        for &x in &[-2.0, 0.0, 0.5, 3.0] {
            let cauchy = 1.0 / (PI * (1.0 + x * x));
            assert_abs_diff_eq!(pdf(x), cauchy, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_student_t_approaches_normal() {
        let t = student_t_pdf(10_000);
        let n = normal_pdf(0.0, 1.0);
        assert_abs_diff_eq!(t(1.0), n(1.0), epsilon = 1e-4);
    }

    #[test]
    fn test_norm_cdf() {
        assert_abs_diff_eq!(norm_cdf(0.0), 0.5, epsilon = 1e-15);
        assert_abs_diff_eq!(norm_cdf(1.959_963_985), 0.975, epsilon = 1e-9);
    }
}
