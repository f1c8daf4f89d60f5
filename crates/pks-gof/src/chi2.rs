//! Pearson chi-square goodness-of-fit test for a fitted peakshape.

use crate::binning::{included_bins, BinData};
use crate::model::expected_counts;
use pks_core::traits::PeakshapeModel;
use pks_core::{Error, GofResult, Histogram, ParameterSet, Result};

/// Expected counts above which the chi-square approximation is considered
/// reliable per bin.
pub(crate) const LOW_COUNT_THRESHOLD: f64 = 5.0;

/// Upper-tail probability of a chi-square distribution with `dof` degrees
/// of freedom, evaluated at `x`.
pub(crate) fn chi_squared_tail(x: f64, dof: f64) -> f64 {
    if x <= 0.0 {
        return 1.0;
    }
    1.0 - statrs::function::gamma::gamma_lr(dof / 2.0, x / 2.0)
}

/// Observed/expected pairs restricted to the positive-expectation bins,
/// with degrees of freedom and the low-count advisory already resolved.
pub(crate) struct TestBins {
    pub observed: Vec<f64>,
    pub expected: Vec<f64>,
    pub dof: usize,
    pub low_count_bins: usize,
}

/// Build the shared per-call test context: evaluate the model, apply the
/// positivity mask once, and validate the degrees of freedom.
pub(crate) fn prepare_test_bins<M: PeakshapeModel + ?Sized>(
    model: &M,
    hist: &Histogram,
    params: &ParameterSet,
) -> Result<TestBins> {
    let bins = BinData::from_histogram(hist);
    let expected_all = expected_counts(model, params, &bins);
    let kept = included_bins(&expected_all);

    if kept.len() <= params.len() {
        return Err(Error::Validation(format!(
            "degrees of freedom must be >= 1: {} included bins, {} free parameters",
            kept.len(),
            params.len()
        )));
    }
    let dof = kept.len() - params.len();

    let observed: Vec<f64> = kept.iter().map(|&i| bins.observed[i]).collect();
    let expected: Vec<f64> = kept.iter().map(|&i| expected_all[i]).collect();
    let low_count_bins = expected.iter().filter(|&&m| m <= LOW_COUNT_THRESHOLD).count();

    Ok(TestBins { observed, expected, dof, low_count_bins })
}

/// Log the per-call diagnostic: warn on low-count bins, otherwise trace
/// the rounded p-value at debug level.
pub(crate) fn log_test_outcome(name: &str, low_count_bins: usize, p_value: f64) {
    if low_count_bins > 0 {
        log::warn!(
            "{name}: {low_count_bins} bin(s) with expected count <= {LOW_COUNT_THRESHOLD}; \
             chi-square p-value may be unreliable"
        );
    } else {
        log::debug!("{name}: p-value = {:.4}", p_value);
    }
}

/// Pearson chi-square p-value for a fitted peakshape against a histogram.
///
/// The statistic is `sum (m - o)^2 / m` over bins with expected count
/// `m > 0`; bins with zero expectation are excluded (the documented
/// approximation, not a stability patch). Degrees of freedom are the
/// number of included bins minus the number of free parameters, and must
/// be at least 1.
pub fn chi_square_gof<M: PeakshapeModel + ?Sized>(
    model: &M,
    hist: &Histogram,
    params: &ParameterSet,
) -> Result<GofResult> {
    let bins = prepare_test_bins(model, hist, params)?;

    let statistic: f64 = bins
        .observed
        .iter()
        .zip(bins.expected.iter())
        .map(|(&o, &m)| (m - o) * (m - o) / m)
        .sum();

    let p_value = chi_squared_tail(statistic, bins.dof as f64);
    log_test_outcome("chi_square_gof", bins.low_count_bins, p_value);

    Ok(GofResult { p_value, statistic, dof: bins.dof, low_count_bins: bins.low_count_bins })
}
