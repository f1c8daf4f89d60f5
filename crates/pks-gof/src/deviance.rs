//! Likelihood-ratio (Poisson deviance) goodness-of-fit test.

use crate::chi2::{chi_squared_tail, log_test_outcome, prepare_test_bins};
use pks_core::traits::PeakshapeModel;
use pks_core::{GofResult, Histogram, ParameterSet, Result};

/// Likelihood-ratio p-value for a fitted peakshape against a histogram.
///
/// Bin selection, degrees of freedom, and the low-count advisory are
/// identical to [`crate::chi2::chi_square_gof`]; the statistic is the
/// Poisson deviance `2 * sum [o*ln(o/m) + m - o]` over the included bins,
/// referred to the same chi-square upper tail. The deviance is twice a
/// Kullback-Leibler divergence and therefore never negative.
///
/// A zero-observed bin takes the limiting contribution `2*m`
/// (`o*ln(o/m) -> 0` as `o -> 0`), the deviance of observing nothing
/// where `m` counts were expected.
pub fn likelihood_ratio_gof<M: PeakshapeModel + ?Sized>(
    model: &M,
    hist: &Histogram,
    params: &ParameterSet,
) -> Result<GofResult> {
    let bins = prepare_test_bins(model, hist, params)?;

    let statistic: f64 = 2.0
        * bins
            .observed
            .iter()
            .zip(bins.expected.iter())
            .map(|(&o, &m)| if o > 0.0 { o * (o / m).ln() + m - o } else { m })
            .sum::<f64>();

    let p_value = chi_squared_tail(statistic, bins.dof as f64);
    log_test_outcome("likelihood_ratio_gof", bins.low_count_bins, p_value);

    Ok(GofResult { p_value, statistic, dof: bins.dof, low_count_bins: bins.low_count_bins })
}
