//! Collaborator traits for PeakStat
//!
//! The GOF subsystem never depends on a concrete peakshape or optimizer:
//! both arrive through these traits, so the expensive re-fitting
//! collaborator can be swapped out (or mocked in tests) without touching
//! the statistics code.

use crate::types::{Histogram, ParameterSet, PeakFit, PeakSampleSpec};
use crate::Result;

/// Parametric peakshape: a pure function mapping `(energy, parameters)`
/// to an expected count density at that energy.
///
/// Densities may legitimately evaluate to zero or near-zero far from the
/// peak; implementations must not treat that as an error.
pub trait PeakshapeModel: Send + Sync {
    /// Expected count density at `energy` for the given parameter set.
    fn density(&self, energy: f64, params: &ParameterSet) -> f64;
}

impl<F> PeakshapeModel for F
where
    F: Fn(f64, &ParameterSet) -> f64 + Send + Sync,
{
    fn density(&self, energy: f64, params: &ParameterSet) -> f64 {
        self(energy, params)
    }
}

/// External single-peak fitting routine.
///
/// Monte Carlo resampling invokes this once per synthetic histogram with
/// `estimate_uncertainty = false` (uncertainties are not consumed on that
/// path and dominate the per-fit cost).
pub trait PeakFitter: Send + Sync {
    /// Fit a single peak in `hist` seeded by `sample_spec`.
    fn fit_peak(
        &self,
        hist: &Histogram,
        sample_spec: &PeakSampleSpec,
        estimate_uncertainty: bool,
    ) -> Result<PeakFit>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_peakshape_models() {
        let flat = |_e: f64, p: &ParameterSet| p.get("level").unwrap_or(0.0);
        let params = ParameterSet::from_pairs([("level", 2.5)]);
        assert_eq!(flat.density(100.0, &params), 2.5);
    }
}
