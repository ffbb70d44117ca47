// src/numerics/inversion.rs
//! Numerical CDF inversion by bracket expansion and bisection
//!
//! # Algorithm
//!
//! Given a non-decreasing CDF `F` and a target probability `p`, find `x` with
//! `F(x) ≈ p`:
//!
//! 1. **Seeding**: `p = 0 → -∞`, `p = 1 → +∞`, and `p = 0.5 → c` for a CDF
//!    that declares a symmetry center `c`.
//! 2. **Bracketing**: start from `[c, c+1]` (for `p > 0.5`) or `[c-1, c]`
//!    (for `p < 0.5`) and double the distance of the open bound until `F`
//!    crosses `p`. CDFs without a center start from `[-1, 1]` and grow each
//!    side on its own. The quadrature step doubles in lockstep, capped at
//!    `max_step`, so evaluation cost stays flat as the bracket widens.
//! 3. **Bisecting**: halve `[L, U]` keeping `F(L) ≤ p ≤ F(U)` until
//!    ```text
//!    F(U) - F(L) ≤ 2ε_p    or    U - L ≤ ε_b
//!    ```
//! 4. **Converged**: return the midpoint.
//!
//! The stages form a straight pipeline; a run never moves backwards.
//!
//! # Density-backed CDFs
//!
//! [`DensityCdf`] integrates a density from its center, using symmetry to
//! halve the integration range:
//! ```text
//! F(x) = 0.5 + ∫[c, x] f     (x > c)
//! F(x) = 0.5 - ∫[x, c] f     (x < c)
//! ```

use super::quadrature::integrate;
use crate::error::{validation::*, SimError, SimResult};
use crate::math_utils::{normal_pdf, student_t_pdf};
use tracing::{trace, warn};

/// Tolerances and budgets for [`invert`]
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InversionConfig {
    /// Acceptable probability error ε_p; bisection stops once the
    /// bracket's probability gap is at most `2 * prob_tolerance`
    pub prob_tolerance: f64,
    /// Bracket-width floor ε_b below which bisection makes no progress
    pub bracket_tolerance: f64,
    /// Quadrature step used while bisecting
    pub step: f64,
    /// Cap on the quadrature step while the bracket grows
    pub max_step: f64,
    /// Bisection budget before a best-effort result is returned
    pub max_iterations: usize,
    /// Bracket growth budget before giving up
    pub max_bracket_doublings: usize,
}

impl Default for InversionConfig {
    fn default() -> Self {
        InversionConfig {
            prob_tolerance: 1e-5,
            bracket_tolerance: 1e-10,
            step: 1e-4,
            max_step: 1.0,
            max_iterations: 200,
            max_bracket_doublings: 64,
        }
    }
}

impl InversionConfig {
    pub fn validate(&self) -> SimResult<()> {
        validate_positive("prob_tolerance", self.prob_tolerance)?;
        validate_positive("bracket_tolerance", self.bracket_tolerance)?;
        validate_positive("step", self.step)?;
        validate_positive("max_step", self.max_step)?;
        if self.max_step < self.step {
            return Err(SimError::InvalidArgument {
                parameter: "max_step".to_string(),
                reason: format!(
                    "must be at least the base step ({}), got {}",
                    self.step, self.max_step
                ),
            });
        }
        Ok(())
    }
}

/// A cumulative distribution function whose evaluation may depend on a
/// quadrature step.
pub trait Cdf {
    /// `F(x)`, integrating with panels no wider than `step` where relevant
    fn cdf(&self, x: f64, step: f64) -> SimResult<f64>;

    /// Center `c` of a symmetric distribution, `F(c) = 0.5`
    fn symmetry_center(&self) -> Option<f64> {
        None
    }
}

#[derive(Debug, Clone, Copy)]
enum Anchor {
    Symmetric(f64),
    LowerBound(f64),
}

/// CDF computed by quadrature of a density
#[derive(Clone)]
pub struct DensityCdf<F> {
    density: F,
    anchor: Anchor,
}

impl<F> DensityCdf<F>
where
    F: Fn(f64) -> f64,
{
    /// Density symmetric about `center`
    pub fn symmetric(density: F, center: f64) -> SimResult<Self> {
        validate_finite("center", center)?;
        Ok(DensityCdf {
            density,
            anchor: Anchor::Symmetric(center),
        })
    }

    /// Density supported on `[lower, ∞)`
    pub fn from_lower_bound(density: F, lower: f64) -> SimResult<Self> {
        validate_finite("lower", lower)?;
        Ok(DensityCdf {
            density,
            anchor: Anchor::LowerBound(lower),
        })
    }
}

impl<F> Cdf for DensityCdf<F>
where
    F: Fn(f64) -> f64,
{
    fn cdf(&self, x: f64, step: f64) -> SimResult<f64> {
        if x.is_nan() {
            return Err(SimError::InvalidArgument {
                parameter: "x".to_string(),
                reason: "CDF argument is NaN".to_string(),
            });
        }
        if x == f64::INFINITY {
            return Ok(1.0);
        }
        if x == f64::NEG_INFINITY {
            return Ok(0.0);
        }

        let f = &self.density;
        let p = match self.anchor {
            Anchor::Symmetric(c) if x == c => 0.5,
            Anchor::Symmetric(c) if x > c => 0.5 + integrate(f, c, x, step)?,
            Anchor::Symmetric(c) => 0.5 - integrate(f, x, c, step)?,
            Anchor::LowerBound(a) if x <= a => 0.0,
            Anchor::LowerBound(a) => integrate(f, a, x, step)?,
        };
        Ok(p.clamp(0.0, 1.0))
    }

    fn symmetry_center(&self) -> Option<f64> {
        match self.anchor {
            Anchor::Symmetric(c) => Some(c),
            Anchor::LowerBound(_) => None,
        }
    }
}

/// Wraps a closed-form CDF; the quadrature step is ignored.
#[derive(Clone)]
pub struct ClosedFormCdf<F> {
    cdf: F,
    center: Option<f64>,
}

impl<F> ClosedFormCdf<F>
where
    F: Fn(f64) -> f64,
{
    pub fn new(cdf: F) -> Self {
        ClosedFormCdf { cdf, center: None }
    }

    pub fn with_center(mut self, center: f64) -> Self {
        self.center = Some(center);
        self
    }
}

impl<F> Cdf for ClosedFormCdf<F>
where
    F: Fn(f64) -> f64,
{
    fn cdf(&self, x: f64, _step: f64) -> SimResult<f64> {
        Ok((self.cdf)(x))
    }

    fn symmetry_center(&self) -> Option<f64> {
        self.center
    }
}

/// Progress of one inversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InversionStage {
    Seeding,
    Bracketing,
    Bisecting,
    Converged,
}

/// Outcome of [`invert`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Inversion {
    pub value: f64,
    pub stage: InversionStage,
    /// Bisection iterations performed
    pub iterations: usize,
    /// `F(U) - F(L)` of the final bracket (zero for shortcuts and exact hits)
    pub probability_gap: f64,
}

impl Inversion {
    fn exact(value: f64, iterations: usize) -> Self {
        Inversion {
            value,
            stage: InversionStage::Converged,
            iterations,
            probability_gap: 0.0,
        }
    }

    pub fn converged(&self) -> bool {
        self.stage == InversionStage::Converged
    }

    /// The value, or `NonConvergence` for a best-effort result
    pub fn require_converged(self) -> SimResult<f64> {
        if self.converged() {
            Ok(self.value)
        } else {
            Err(SimError::NonConvergence {
                method: "CDF bisection".to_string(),
                iterations: self.iterations,
                reason: format!(
                    "best estimate {} with probability gap {:.3e}",
                    self.value, self.probability_gap
                ),
            })
        }
    }
}

/// Find `x` with `cdf(x) ≈ p`.
///
/// # Errors
///
/// - `InvalidArgument` for `p` outside `[0, 1]` or an invalid config
/// - `NonConvergence` when the bracket cannot be grown to contain `p`
///
/// Exhausting the bisection budget is not an error; the returned
/// [`Inversion`] then reports `converged() == false`.
pub fn invert<C>(cdf: &C, p: f64, cfg: &InversionConfig) -> SimResult<Inversion>
where
    C: Cdf + ?Sized,
{
    cfg.validate()?;
    validate_probability("p", p)?;

    trace!(p, stage = ?InversionStage::Seeding, "inverting CDF");
    if p == 0.0 {
        return Ok(Inversion::exact(f64::NEG_INFINITY, 0));
    }
    if p == 1.0 {
        return Ok(Inversion::exact(f64::INFINITY, 0));
    }
    let center = cdf.symmetry_center();
    if let Some(c) = center {
        if p == 0.5 {
            return Ok(Inversion::exact(c, 0));
        }
    }

    trace!(stage = ?InversionStage::Bracketing);
    let (mut lo, mut hi) = bracket(cdf, p, center, cfg)?;

    trace!(lo, hi, stage = ?InversionStage::Bisecting);
    let mut p_lo = cdf.cdf(lo, cfg.step)?;
    let mut p_hi = cdf.cdf(hi, cfg.step)?;
    let mut iterations = 0;

    while p_hi - p_lo > 2.0 * cfg.prob_tolerance && hi - lo > cfg.bracket_tolerance {
        if iterations >= cfg.max_iterations {
            let value = 0.5 * (lo + hi);
            warn!(
                p,
                value,
                gap = p_hi - p_lo,
                "CDF bisection exhausted its iteration budget"
            );
            return Ok(Inversion {
                value,
                stage: InversionStage::Bisecting,
                iterations,
                probability_gap: p_hi - p_lo,
            });
        }

        let mid = 0.5 * (lo + hi);
        // Floating-point stagnation: the bracket cannot be split further
        if mid <= lo || mid >= hi {
            break;
        }

        let p_mid = cdf.cdf(mid, cfg.step)?;
        iterations += 1;
        if p_mid > p {
            hi = mid;
            p_hi = p_mid;
        } else if p_mid < p {
            lo = mid;
            p_lo = p_mid;
        } else {
            trace!(mid, iterations, "exact hit");
            return Ok(Inversion::exact(mid, iterations));
        }
    }

    let value = 0.5 * (lo + hi);
    trace!(value, iterations, stage = ?InversionStage::Converged);
    Ok(Inversion {
        value,
        stage: InversionStage::Converged,
        iterations,
        probability_gap: p_hi - p_lo,
    })
}

fn bracket<C>(
    cdf: &C,
    p: f64,
    center: Option<f64>,
    cfg: &InversionConfig,
) -> SimResult<(f64, f64)>
where
    C: Cdf + ?Sized,
{
    let grow = |step: f64| (2.0 * step).min(cfg.max_step);
    let exhausted = |side: &str, bound: f64| SimError::NonConvergence {
        method: "CDF bracket search".to_string(),
        iterations: cfg.max_bracket_doublings,
        reason: format!("{} bound reached {} without crossing p = {}", side, bound, p),
    };

    match center {
        Some(c) if p > 0.5 => {
            let mut width = 1.0;
            let mut step = cfg.step;
            let mut doublings = 0;
            while cdf.cdf(c + width, step)? < p {
                if doublings == cfg.max_bracket_doublings {
                    return Err(exhausted("upper", c + width));
                }
                width *= 2.0;
                step = grow(step);
                doublings += 1;
            }
            Ok((c, c + width))
        }
        Some(c) => {
            let mut width = 1.0;
            let mut step = cfg.step;
            let mut doublings = 0;
            while cdf.cdf(c - width, step)? > p {
                if doublings == cfg.max_bracket_doublings {
                    return Err(exhausted("lower", c - width));
                }
                width *= 2.0;
                step = grow(step);
                doublings += 1;
            }
            Ok((c - width, c))
        }
        None => {
            let mut hi = 1.0;
            let mut step = cfg.step;
            let mut doublings = 0;
            while cdf.cdf(hi, step)? < p {
                if doublings == cfg.max_bracket_doublings {
                    return Err(exhausted("upper", hi));
                }
                hi *= 2.0;
                step = grow(step);
                doublings += 1;
            }

            let mut lo = -1.0;
            let mut step = cfg.step;
            let mut doublings = 0;
            while cdf.cdf(lo, step)? > p {
                if doublings == cfg.max_bracket_doublings {
                    return Err(exhausted("lower", lo));
                }
                lo *= 2.0;
                step = grow(step);
                doublings += 1;
            }
            Ok((lo, hi))
        }
    }
}

/// Quadrature-backed CDF of N(0, 1)
pub fn standard_normal_cdf() -> DensityCdf<impl Fn(f64) -> f64 + Clone + Send + Sync> {
    DensityCdf {
        density: normal_pdf(0.0, 1.0),
        anchor: Anchor::Symmetric(0.0),
    }
}

/// Quadrature-backed CDF of Student's t with `dof` degrees of freedom
pub fn student_t_cdf(
    dof: u32,
) -> SimResult<DensityCdf<impl Fn(f64) -> f64 + Clone + Send + Sync>> {
    if dof == 0 {
        return Err(SimError::InvalidArgument {
            parameter: "dof".to_string(),
            reason: "degrees of freedom must be at least 1".to_string(),
        });
    }
    Ok(DensityCdf {
        density: student_t_pdf(dof),
        anchor: Anchor::Symmetric(0.0),
    })
}

/// Φ⁻¹(p), the critical-value lookup used by the Monte Carlo engine
pub fn inverse_standard_normal_cdf(p: f64, cfg: &InversionConfig) -> SimResult<f64> {
    invert(&standard_normal_cdf(), p, cfg)?.require_converged()
}

pub fn inverse_student_t_cdf(dof: u32, p: f64, cfg: &InversionConfig) -> SimResult<f64> {
    invert(&student_t_cdf(dof)?, p, cfg)?.require_converged()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math_utils::norm_cdf;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_shortcuts_skip_numerical_work() {
        let cfg = InversionConfig::default();
        let cdf = standard_normal_cdf();

        let r = invert(&cdf, 0.5, &cfg).unwrap();
        assert_eq!(r.value, 0.0);
        assert_eq!(r.iterations, 0);
        assert!(r.converged());

        assert_eq!(invert(&cdf, 0.0, &cfg).unwrap().value, f64::NEG_INFINITY);
        assert_eq!(invert(&cdf, 1.0, &cfg).unwrap().value, f64::INFINITY);
    }

    #[test]
    fn test_rejects_out_of_range_probability() {
        let cfg = InversionConfig::default();
        let cdf = standard_normal_cdf();
        assert!(matches!(
            invert(&cdf, 1.2, &cfg),
            Err(SimError::InvalidArgument { .. })
        ));
        assert!(invert(&cdf, -0.1, &cfg).is_err());
        assert!(invert(&cdf, f64::NAN, &cfg).is_err());
    }

    #[test]
    fn test_density_cdf_matches_closed_form() {
        let cdf = standard_normal_cdf();
        for &x in &[-3.0, -1.0, -0.25, 0.0, 0.7, 2.5] {
            assert_abs_diff_eq!(cdf.cdf(x, 1e-3).unwrap(), norm_cdf(x), epsilon = 1e-10);
        }
        assert_eq!(cdf.cdf(f64::INFINITY, 1e-3).unwrap(), 1.0);
        assert_eq!(cdf.cdf(f64::NEG_INFINITY, 1e-3).unwrap(), 0.0);
        assert!(cdf.cdf(f64::NAN, 1e-3).is_err());
    }

    #[test]
    fn test_inverse_standard_normal() {
        let cfg = InversionConfig::default();
        let z = inverse_standard_normal_cdf(0.975, &cfg).unwrap();
        assert_abs_diff_eq!(z, 1.959_96, epsilon = 1e-3);

        let z = inverse_standard_normal_cdf(0.025, &cfg).unwrap();
        assert_abs_diff_eq!(z, -1.959_96, epsilon = 1e-3);
    }

    #[test]
    fn test_shifted_center() {
        let cfg = InversionConfig::default();
        let cdf = DensityCdf::symmetric(normal_pdf(10.0, 2.0), 10.0).unwrap();

        assert_eq!(invert(&cdf, 0.5, &cfg).unwrap().value, 10.0);
        let x = invert(&cdf, 0.975, &cfg).unwrap().value;
        assert_abs_diff_eq!(x, 10.0 + 2.0 * 1.959_96, epsilon = 2e-3);
    }

    #[test]
    fn test_lower_bound_density_without_center() {
        // Exponential(2): F(x) = 1 - exp(-2x), median ln(2)/2
        let cfg = InversionConfig::default();
        let cdf = DensityCdf::from_lower_bound(|x: f64| 2.0 * (-2.0 * x).exp(), 0.0).unwrap();

        let r = invert(&cdf, 0.5, &cfg).unwrap();
        assert!(r.converged());
        assert_abs_diff_eq!(r.value, std::f64::consts::LN_2 / 2.0, epsilon = 1e-4);
        assert_eq!(cdf.cdf(-1.0, 1e-3).unwrap(), 0.0);
    }

    #[test]
    fn test_closed_form_cdf() {
        let cfg = InversionConfig::default();
        let cdf = ClosedFormCdf::new(norm_cdf);
        let r = invert(&cdf, 0.9, &cfg).unwrap();
        assert!((norm_cdf(r.value) - 0.9).abs() <= 2.0 * cfg.prob_tolerance);
    }

    #[test]
    fn test_exact_hit_on_midpoint() {
        // Uniform(-1, 1): the first midpoint of [0, 1] is 0.5 with F = 0.75
        let cfg = InversionConfig::default();
        let cdf = ClosedFormCdf::new(|x: f64| ((x + 1.0) / 2.0).clamp(0.0, 1.0)).with_center(0.0);
        let r = invert(&cdf, 0.75, &cfg).unwrap();
        assert_eq!(r.value, 0.5);
        assert_eq!(r.iterations, 1);
        assert_eq!(r.probability_gap, 0.0);
    }

    #[test]
    fn test_iteration_budget_yields_best_effort() {
        let cfg = InversionConfig {
            max_iterations: 3,
            ..Default::default()
        };
        let r = invert(&standard_normal_cdf(), 0.8, &cfg).unwrap();
        assert_eq!(r.stage, InversionStage::Bisecting);
        assert!(!r.converged());
        assert_eq!(r.iterations, 3);
        assert!(matches!(
            r.require_converged(),
            Err(SimError::NonConvergence { iterations: 3, .. })
        ));
    }

    #[test]
    fn test_unreachable_probability_fails_bracketing() {
        // A defective CDF that never exceeds 0.6
        let cfg = InversionConfig {
            max_bracket_doublings: 8,
            ..Default::default()
        };
        let cdf = ClosedFormCdf::new(|x: f64| 0.6 * norm_cdf(x));
        assert!(matches!(
            invert(&cdf, 0.9, &cfg),
            Err(SimError::NonConvergence { .. })
        ));
    }

    #[test]
    fn test_bracket_width_floor_terminates() {
        // A step CDF never closes the probability gap; the width floor must stop it
        let cfg = InversionConfig::default();
        let cdf = ClosedFormCdf::new(|x: f64| if x < 0.3 { 0.2 } else { 0.8 });
        let r = invert(&cdf, 0.5, &cfg).unwrap();
        assert!(r.converged());
        assert_abs_diff_eq!(r.value, 0.3, epsilon = 1e-9);
    }

    #[test]
    fn test_invalid_config() {
        let cfg = InversionConfig {
            max_step: 1e-6,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
        assert!(invert(&standard_normal_cdf(), 0.7, &cfg).is_err());
    }

    #[test]
    fn test_student_t_zero_dof_rejected() {
        assert!(student_t_cdf(0).is_err());
        assert!(inverse_student_t_cdf(0, 0.9, &InversionConfig::default()).is_err());
    }
}
