// src/mc/mc_engine.rs
use crate::error::{validation::*, SimError, SimResult};
use crate::mc::control_variate::CovarianceModel;
use crate::mc::estimate::{Estimate, Outcome};
use crate::numerics::inversion::{inverse_standard_normal_cdf, InversionConfig};
use crate::rng::RngFactory;
use rand::rngs::StdRng;
use rayon::prelude::*;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct McConfig {
    /// Base seed for the per-trial streams of [`simulate_parallel`]
    pub seed: u64,
    /// Tolerances for the critical-value lookup
    pub inversion: InversionConfig,
    /// Largest acceptable condition number of the control covariance matrix
    pub max_condition_number: f64,
    /// Known expectations of the controls; when set the adjustment is
    /// centred on them instead of on the sample means
    pub known_control_means: Option<Vec<f64>>,
}

impl McConfig {
    /// Validate the Monte Carlo configuration
    pub fn validate(&self) -> SimResult<()> {
        self.inversion.validate()?;
        validate_positive("max_condition_number", self.max_condition_number)?;
        if self.max_condition_number < 1.0 {
            return Err(SimError::InvalidArgument {
                parameter: "max_condition_number".to_string(),
                reason: format!(
                    "condition numbers are at least 1, got {}",
                    self.max_condition_number
                ),
            });
        }
        if let Some(means) = &self.known_control_means {
            for &m in means {
                validate_finite("known_control_means", m)?;
            }
        }
        Ok(())
    }
}

impl Default for McConfig {
    fn default() -> Self {
        McConfig {
            seed: 12345,
            inversion: InversionConfig::default(),
            max_condition_number: 1e12,
            known_control_means: None,
        }
    }
}

/// Monte Carlo estimator over a caller-supplied trial
///
/// # Math Framework
///
/// For N independent trial responses `yᵢ` the estimator reports
/// ```text
/// ȳ ± z_{1-α/2} * s / √N,     s² = Σ(yᵢ - ȳ)² / (N - 1)
/// ```
/// where `z` is obtained by numerically inverting the standard normal CDF.
///
/// # Control Variates
///
/// When trials report control covariates, the responses are first replaced
/// by their regression-adjusted values `yᵢ - b·(xᵢ - x̄)` (see
/// [`CovarianceModel`]), which keeps the mean and shrinks the interval
/// whenever the controls correlate with the response. The strategy is chosen
/// by the outcomes alone; there is a single engine type.
pub struct MonteCarlo<F> {
    trial: F,
    config: McConfig,
}

impl<F> MonteCarlo<F> {
    pub fn new(trial: F) -> Self {
        Self::with_config(trial, McConfig::default())
    }

    pub fn with_config(trial: F, config: McConfig) -> Self {
        MonteCarlo { trial, config }
    }

    pub fn config(&self) -> &McConfig {
        &self.config
    }
}

impl<F, O> MonteCarlo<F>
where
    F: FnMut() -> O,
    O: Into<Outcome>,
{
    /// Run `trials` trials and report a `(1 - alpha)` confidence interval.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` when `trials <= 1`, `alpha ∉ (0, 1)`, or the
    ///   trials disagree on the number of controls. Argument checks happen
    ///   before any trial runs.
    /// - `NumericalError` for non-finite trial output or a singular control
    ///   covariance matrix
    /// - `NonConvergence` if the critical value cannot be computed
    pub fn simulate(&mut self, trials: usize, alpha: f64) -> SimResult<Estimate> {
        validate_trials(trials)?;
        validate_significance("alpha", alpha)?;
        self.config.validate()?;

        debug!(trials, alpha, "running Monte Carlo simulation");
        let outcomes: Vec<Outcome> = (0..trials).map(|_| (self.trial)().into()).collect();
        aggregate(outcomes, alpha, &self.config)
    }
}

/// Parallel counterpart of [`MonteCarlo::simulate`].
///
/// Trial `i` receives its own `StdRng` derived from `config.seed` and `i`,
/// so the estimate does not depend on how rayon schedules the trials.
pub fn simulate_parallel<F, O>(
    trial: F,
    trials: usize,
    alpha: f64,
    config: &McConfig,
) -> SimResult<Estimate>
where
    F: Fn(&mut StdRng) -> O + Sync + Send,
    O: Into<Outcome> + Send,
{
    validate_trials(trials)?;
    validate_significance("alpha", alpha)?;
    config.validate()?;

    debug!(trials, alpha, seed = config.seed, "running parallel Monte Carlo simulation");
    let factory = RngFactory::new(config.seed);
    let outcomes: Vec<Outcome> = (0..trials)
        .into_par_iter()
        .map(|i| {
            let mut rng = factory.create_std_rng(i as u64);
            trial(&mut rng).into()
        })
        .collect();
    aggregate(outcomes, alpha, config)
}

fn aggregate(outcomes: Vec<Outcome>, alpha: f64, config: &McConfig) -> SimResult<Estimate> {
    let d = outcomes.first().map_or(0, |o| o.controls.len());

    let mut ys = Vec::with_capacity(outcomes.len());
    let mut xs = Vec::with_capacity(if d > 0 { outcomes.len() } else { 0 });
    for (i, outcome) in outcomes.into_iter().enumerate() {
        if outcome.controls.len() != d {
            return Err(SimError::InvalidArgument {
                parameter: "controls".to_string(),
                reason: format!(
                    "trial {} reported {} controls, expected {}",
                    i,
                    outcome.controls.len(),
                    d
                ),
            });
        }
        if !outcome.response.is_finite() || outcome.controls.iter().any(|x| !x.is_finite()) {
            return Err(SimError::NumericalError {
                method: "Monte Carlo".to_string(),
                reason: format!("trial {} produced a non-finite outcome: {:?}", i, outcome),
            });
        }
        ys.push(outcome.response);
        if d > 0 {
            xs.push(outcome.controls);
        }
    }

    let estimate = if d == 0 {
        estimate_from_samples(&ys, alpha, config)?
    } else {
        control_variate_estimate(&ys, &xs, alpha, config)?
    };
    debug!(
        value = estimate.value,
        half_width = estimate.half_width(),
        controls = d,
        "Monte Carlo estimate"
    );
    Ok(estimate)
}

/// Sample mean and unbiased sample variance.
///
/// Deviations are taken from the first sample before averaging, so a
/// constant sample yields exactly that constant and a variance of zero.
pub fn sample_summary(data: &[f64]) -> (f64, f64) {
    let n = data.len();
    if n == 0 {
        return (f64::NAN, f64::NAN);
    }
    let shift = data[0];
    let nf = n as f64;

    let mean_offset = data.iter().map(|y| y - shift).sum::<f64>() / nf;
    let mean = shift + mean_offset;
    if n == 1 {
        return (mean, f64::NAN);
    }

    let sum_sq: f64 = data.iter().map(|y| (y - shift - mean_offset).powi(2)).sum();
    (mean, sum_sq / (nf - 1.0))
}

/// Normal-approximation interval from raw responses
pub fn estimate_from_samples(ys: &[f64], alpha: f64, config: &McConfig) -> SimResult<Estimate> {
    validate_trials(ys.len())?;
    validate_significance("alpha", alpha)?;
    if let Some(i) = ys.iter().position(|y| !y.is_finite()) {
        return Err(SimError::NumericalError {
            method: "Monte Carlo".to_string(),
            reason: format!("sample {} is not finite: {}", i, ys[i]),
        });
    }

    let n = ys.len() as f64;
    let (mean, variance) = sample_summary(ys);
    if !mean.is_finite() || !variance.is_finite() {
        return Err(SimError::NumericalError {
            method: "Monte Carlo".to_string(),
            reason: format!(
                "sample moments are not finite: mean {}, variance {}",
                mean, variance
            ),
        });
    }

    // A constant sample has an exact interval whatever z is. For alpha small
    // enough that 1 - alpha/2 rounds to 1, z is +∞ and the interval unbounded.
    let half_width = if variance == 0.0 {
        0.0
    } else {
        let z = inverse_standard_normal_cdf(1.0 - alpha / 2.0, &config.inversion)?;
        z * (variance / n).sqrt()
    };
    Ok(Estimate::symmetric(mean, 1.0 - alpha, half_width))
}

/// Interval from responses adjusted by their regression on `xs`
pub fn control_variate_estimate(
    ys: &[f64],
    xs: &[Vec<f64>],
    alpha: f64,
    config: &McConfig,
) -> SimResult<Estimate> {
    validate_trials(ys.len())?;
    validate_significance("alpha", alpha)?;
    if let Some((i, row)) = xs
        .iter()
        .enumerate()
        .find(|(_, row)| row.iter().any(|x| !x.is_finite()))
    {
        return Err(SimError::NumericalError {
            method: "Monte Carlo".to_string(),
            reason: format!("controls of sample {} are not finite: {:?}", i, row),
        });
    }

    let mut model = CovarianceModel::fit(ys, xs, config.max_condition_number)?;
    if let Some(means) = &config.known_control_means {
        model = model.centred_on(means)?;
    }
    debug!(coefficients = ?model.coefficients.as_slice(), "control variate regression");

    let adjusted = model.adjust(ys, xs);
    estimate_from_samples(&adjusted, alpha, config)
}
