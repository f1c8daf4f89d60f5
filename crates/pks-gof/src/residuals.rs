//! Per-bin residuals and Poisson-tail significance.

use crate::binning::{included_bins, BinData};
use crate::model::expected_counts;
use pks_core::traits::PeakshapeModel;
use pks_core::{Error, Histogram, ParameterSet, ResidualResult, Result};
use statrs::distribution::{DiscreteCDF, Poisson};

/// Two-tailed Poisson significance of a residual: the probability that a
/// count at least as extreme as the observed one occurs under the model,
/// `P(X <= m - |r|) + P(X > m + |r|)` for `X ~ Poisson(m)`.
fn poisson_two_tailed(expected: f64, residual: f64) -> Result<f64> {
    let pois = Poisson::new(expected)
        .map_err(|e| Error::Computation(format!("Poisson({expected}): {e}")))?;

    let r = residual.abs();
    let lo = expected - r;
    let hi = expected + r;

    // P(X <= lo) for real lo is the CDF at floor(lo); zero when lo < 0.
    let lower = if lo < 0.0 { 0.0 } else { pois.cdf(lo.floor() as u64) };
    // P(X > hi) = P(X > floor(hi)) for integer-valued X.
    let upper = pois.sf(hi.floor() as u64);

    Ok((lower + upper).clamp(0.0, 1.0))
}

/// Per-bin residual diagnostics for a fitted peakshape.
///
/// Residuals are `model - observed`, normalized by `sqrt(model)` (Poisson
/// variance ~ mean), restricted to bins with positive expected count. The
/// returned vectors all share that bin subset and ordering.
pub fn residual_analysis<M: PeakshapeModel + ?Sized>(
    model: &M,
    hist: &Histogram,
    params: &ParameterSet,
) -> Result<ResidualResult> {
    let bins = BinData::from_histogram(hist);
    let expected_all = expected_counts(model, params, &bins);
    let kept = included_bins(&expected_all);

    let mut residuals = Vec::with_capacity(kept.len());
    let mut normalized = Vec::with_capacity(kept.len());
    let mut p_values = Vec::with_capacity(kept.len());
    let mut centers = Vec::with_capacity(kept.len());

    for &i in &kept {
        let m = expected_all[i];
        let r = m - bins.observed[i];
        residuals.push(r);
        normalized.push(r / m.sqrt());
        p_values.push(poisson_two_tailed(m, r)?);
        centers.push(bins.centers[i]);
    }

    Ok(ResidualResult { residuals, normalized, p_values, centers })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_model(level: f64) -> impl Fn(f64, &ParameterSet) -> f64 {
        move |_e: f64, _p: &ParameterSet| level
    }

    #[test]
    fn residual_identities_hold_per_bin() {
        let hist =
            Histogram::new(vec![0.0, 1.0, 2.0, 3.0, 4.0], vec![5.0, 9.0, 7.0, 4.0]).unwrap();
        let res = residual_analysis(&flat_model(6.0), &hist, &ParameterSet::new()).unwrap();
        assert_eq!(res.residuals.len(), 4);
        for (i, (&o, &c)) in hist.counts().iter().zip(hist.centers().iter()).enumerate() {
            let r = 6.0 - o;
            assert!((res.residuals[i] - r).abs() < 1e-12);
            assert!((res.normalized[i] - r / 6.0_f64.sqrt()).abs() < 1e-12);
            assert_eq!(res.centers[i], c);
            assert!((0.0..=1.0).contains(&res.p_values[i]));
        }
    }

    #[test]
    fn zero_expectation_bins_are_dropped_consistently() {
        let window = |e: f64, _p: &ParameterSet| if e > 2.0 { 5.0 } else { 0.0 };
        let hist =
            Histogram::new(vec![0.0, 1.0, 2.0, 3.0, 4.0], vec![1.0, 1.0, 4.0, 6.0]).unwrap();
        let res = residual_analysis(&window, &hist, &ParameterSet::new()).unwrap();
        assert_eq!(res.residuals.len(), 2);
        assert_eq!(res.centers, vec![2.5, 3.5]);
        assert_eq!(res.normalized.len(), res.residuals.len());
        assert_eq!(res.p_values.len(), res.residuals.len());
    }

    #[test]
    fn exact_match_has_maximal_tail_probability() {
        // r = 0: the two tails cover the whole support, P(X <= m) + P(X > m) = 1.
        let p = poisson_two_tailed(6.0, 0.0).unwrap();
        assert!((p - 1.0).abs() < 1e-12, "p = {p}");
    }

    #[test]
    fn large_residuals_are_significant() {
        let p_small = poisson_two_tailed(100.0, 5.0).unwrap();
        let p_large = poisson_two_tailed(100.0, 50.0).unwrap();
        assert!(p_large < p_small, "{p_large} vs {p_small}");
        assert!(p_large < 1e-4, "5-sigma-ish residual should be rare: {p_large}");
    }

    #[test]
    fn lower_tail_vanishes_when_residual_exceeds_expectation() {
        // m - |r| < 0: only the upper tail contributes.
        let p = poisson_two_tailed(3.0, 10.0).unwrap();
        assert!(p > 0.0 && p < 1.0);
    }
}
