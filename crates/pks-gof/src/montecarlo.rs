//! Monte-Carlo-resampled goodness-of-fit.
//!
//! Each sample Poisson-fluctuates the best-fit expectations, re-fits the
//! synthetic histogram through the external [`PeakFitter`], and scores the
//! refit's binned Poisson log-likelihood. The empirical p-value is the
//! fraction of valid samples scoring at or below the observed best fit.
//!
//! Randomness is deterministic via per-sample seeding (`seed + sample_idx`),
//! independent of threading.

use crate::binning::BinData;
use crate::likelihood::poisson_log_likelihood;
use crate::model::expected_counts;
use pks_core::traits::{PeakFitter, PeakshapeModel};
use pks_core::{Error, Histogram, MonteCarloResult, ParameterSet, PeakFit, PeakSampleSpec, Result};
use rand::SeedableRng;
use rand_distr::{Distribution, Poisson};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Canonical sub-tuple of refit parameters used to rebuild the sample's
/// model function, in the order the external fitter reports them.
pub const REFIT_PARAM_NAMES: [&str; 7] = [
    "position",
    "sigma",
    "amplitude",
    "step_amplitude",
    "skew_fraction",
    "skew_width",
    "background",
];

/// Configuration for [`monte_carlo_gof`].
#[derive(Debug, Clone, Default)]
pub struct MonteCarloConfig {
    /// Number of synthetic samples. `None` uses [`DEFAULT_N_SAMPLES`].
    pub n_samples: Option<usize>,
    /// Base RNG seed; sample `i` uses `seed + i`.
    pub seed: u64,
    /// Optional cancellation flag: setting it aborts the sweep with
    /// [`Error::Cancelled`].
    pub cancel: Option<Arc<AtomicBool>>,
}

/// Default number of Monte Carlo samples.
pub const DEFAULT_N_SAMPLES: usize = 1000;

/// Sample one Poisson-fluctuated count vector from per-bin expectations.
///
/// Non-positive or non-finite expectations yield a deterministic 0, the
/// correct `Poisson(0)` limit.
pub fn poisson_counts_from_expected(expected: &[f64], seed: u64) -> Vec<f64> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    expected
        .iter()
        .map(|&lam| {
            if !lam.is_finite() || lam <= 0.0 {
                return 0.0;
            }
            let pois = Poisson::new(lam).expect("Poisson::new(lambda>0)");
            pois.sample(&mut rng)
        })
        .collect()
}

/// Extract the canonical refit sub-tuple from the external fitter's
/// parameter record.
fn refit_parameters(fit: &PeakFit) -> Result<ParameterSet> {
    let mut params = ParameterSet::new();
    for name in REFIT_PARAM_NAMES {
        let value = fit.parameters.get(name).ok_or_else(|| {
            Error::FitFailed(format!("refit parameter record is missing '{name}'"))
        })?;
        params.insert(name.to_string(), value);
    }
    Ok(params)
}

#[derive(Debug, Clone, Copy, Default)]
struct SampleTally {
    n_le: usize,
    n_valid: usize,
    n_failed: usize,
    n_nonconverged: usize,
}

impl SampleTally {
    fn merge(a: Self, b: Self) -> Self {
        Self {
            n_le: a.n_le + b.n_le,
            n_valid: a.n_valid + b.n_valid,
            n_failed: a.n_failed + b.n_failed,
            n_nonconverged: a.n_nonconverged + b.n_nonconverged,
        }
    }
}

/// Monte-Carlo-resampled p-value for a fitted peakshape against a histogram.
///
/// Per-sample refit failures are excluded from the p-value denominator —
/// never counted as a pass or a fail — and surfaced in
/// [`MonteCarloResult::n_failed`]. Fails with [`Error::Computation`] if
/// every sample's refit failed, and with [`Error::Validation`] if the
/// requested sample count is zero.
///
/// The per-sample loop is embarrassingly parallel: every iteration reads
/// only the shared model, edges, and expectations, and each sample owns
/// its RNG and synthetic counts.
pub fn monte_carlo_gof<M, F>(
    model: &M,
    fitter: &F,
    hist: &Histogram,
    sample_spec: &PeakSampleSpec,
    params: &ParameterSet,
    config: &MonteCarloConfig,
) -> Result<MonteCarloResult>
where
    M: PeakshapeModel + ?Sized,
    F: PeakFitter + ?Sized,
{
    let n_samples = config.n_samples.unwrap_or(DEFAULT_N_SAMPLES);
    if n_samples == 0 {
        return Err(Error::Validation("n_samples must be > 0".into()));
    }

    let bins = BinData::from_histogram(hist);
    let expected_obs = expected_counts(model, params, &bins);
    let observed_ll = poisson_log_likelihood(&bins.observed, &expected_obs);
    if !observed_ll.is_finite() {
        return Err(Error::Computation(format!(
            "observed best-fit log-likelihood is not finite: {observed_ll}"
        )));
    }

    let cancel = config.cancel.as_deref();

    let tally = (0..n_samples)
        .into_par_iter()
        .with_min_len(16)
        .map(|sample_idx| {
            if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                return SampleTally::default();
            }

            let sample_seed = config.seed.wrapping_add(sample_idx as u64);
            let counts = poisson_counts_from_expected(&expected_obs, sample_seed);

            let synthetic = match hist.with_counts(counts) {
                Ok(h) => h,
                Err(_) => return SampleTally { n_failed: 1, ..Default::default() },
            };

            // Uncertainty estimation is disabled: each sample only needs
            // the refit point estimate.
            let fit = match fitter.fit_peak(&synthetic, sample_spec, false) {
                Ok(fit) => fit,
                Err(_) => return SampleTally { n_failed: 1, ..Default::default() },
            };
            let refit = match refit_parameters(&fit) {
                Ok(p) => p,
                Err(_) => return SampleTally { n_failed: 1, ..Default::default() },
            };

            let sample_bins = BinData::from_histogram(&synthetic);
            let sample_expected = expected_counts(model, &refit, &sample_bins);
            let sample_ll = poisson_log_likelihood(&sample_bins.observed, &sample_expected);
            if !sample_ll.is_finite() {
                return SampleTally { n_failed: 1, ..Default::default() };
            }

            SampleTally {
                n_le: usize::from(sample_ll <= observed_ll),
                n_valid: 1,
                n_failed: 0,
                n_nonconverged: usize::from(!fit.report.converged),
            }
        })
        .reduce(SampleTally::default, SampleTally::merge);

    if let Some(flag) = cancel {
        if flag.load(Ordering::Relaxed) {
            return Err(Error::Cancelled("Monte Carlo GOF sweep aborted".into()));
        }
    }

    if tally.n_valid == 0 {
        return Err(Error::Computation(format!(
            "all {n_samples} Monte Carlo samples failed to refit"
        )));
    }

    if tally.n_failed > 0 {
        log::warn!(
            "monte_carlo_gof: {} of {} sample refits failed and were excluded",
            tally.n_failed,
            n_samples
        );
    }

    Ok(MonteCarloResult {
        p_value: tally.n_le as f64 / tally.n_valid as f64,
        n_samples,
        n_valid: tally.n_valid,
        n_failed: tally.n_failed,
        n_nonconverged: tally.n_nonconverged,
    })
}
