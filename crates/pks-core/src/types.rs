//! Common data types for PeakStat

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Binned gamma-ray spectrum: `n_bins + 1` strictly increasing edges and
/// `n_bins` non-negative counts.
///
/// Edges are held behind an [`Arc`] so that synthetic histograms produced
/// during Monte Carlo resampling share the edge allocation instead of
/// cloning it once per sample.
#[derive(Debug, Clone)]
pub struct Histogram {
    edges: Arc<[f64]>,
    counts: Vec<f64>,
}

impl Histogram {
    /// Create a histogram, validating the edge/count invariants.
    pub fn new(edges: Vec<f64>, counts: Vec<f64>) -> Result<Self> {
        if edges.len() < 2 {
            return Err(Error::Validation(format!(
                "histogram needs at least 2 edges, got {}",
                edges.len()
            )));
        }
        if counts.len() + 1 != edges.len() {
            return Err(Error::Validation(format!(
                "edge/count length mismatch: {} edges vs {} counts",
                edges.len(),
                counts.len()
            )));
        }
        if edges.windows(2).any(|w| !(w[1] > w[0])) {
            return Err(Error::Validation("histogram edges must be strictly increasing".into()));
        }
        if counts.iter().any(|&c| !c.is_finite() || c < 0.0) {
            return Err(Error::Validation("histogram counts must be finite and >= 0".into()));
        }
        Ok(Self { edges: edges.into(), counts })
    }

    /// Number of bins.
    pub fn n_bins(&self) -> usize {
        self.counts.len()
    }

    /// Bin edges (length `n_bins + 1`).
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Bin counts (length `n_bins`).
    pub fn counts(&self) -> &[f64] {
        &self.counts
    }

    /// Bin centers, `(left + right) / 2` per bin.
    pub fn centers(&self) -> Vec<f64> {
        self.edges.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect()
    }

    /// Bin widths, `right - left` per bin.
    pub fn widths(&self) -> Vec<f64> {
        self.edges.windows(2).map(|w| w[1] - w[0]).collect()
    }

    /// Sibling histogram with the same (shared) edges and replaced counts.
    ///
    /// Used for synthetic Monte Carlo datasets; the caller's histogram is
    /// never mutated.
    pub fn with_counts(&self, counts: Vec<f64>) -> Result<Self> {
        if counts.len() != self.counts.len() {
            return Err(Error::Validation(format!(
                "replacement counts length {} != {} bins",
                counts.len(),
                self.counts.len()
            )));
        }
        Ok(Self { edges: Arc::clone(&self.edges), counts })
    }
}

/// Ordered name→value record of fit parameters.
///
/// Opaque to the GOF core: field names are only interpreted by the
/// peakshape model and the external re-fitter. The core uses the length
/// (free-parameter count for degrees of freedom) and name lookup (to
/// extract the canonical refit sub-tuple).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    names: Vec<String>,
    values: Vec<f64>,
}

impl ParameterSet {
    /// Empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(name, value)` pairs.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut set = Self::new();
        for (name, value) in pairs {
            set.insert(name.into(), value);
        }
        set
    }

    /// Insert or overwrite a parameter.
    pub fn insert(&mut self, name: String, value: f64) {
        match self.names.iter().position(|n| *n == name) {
            Some(i) => self.values[i] = value,
            None => {
                self.names.push(name);
                self.values.push(value);
            }
        }
    }

    /// Look up a parameter by name.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.names.iter().position(|n| n == name).map(|i| self.values[i])
    }

    /// Number of free parameters.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Parameter names in insertion order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Parameter values in insertion order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Seed peak characteristics forwarded to the external re-fitter when
/// bootstrapping Monte Carlo samples. Opaque to the GOF core.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeakSampleSpec {
    /// Peak position estimate (energy units).
    pub position: f64,
    /// Full width at half maximum estimate.
    pub fwhm: f64,
    /// Gaussian sigma estimate.
    pub sigma: f64,
    /// Total counts estimate in the peak region.
    pub counts: f64,
    /// Mean background level per bin.
    pub mean_background: f64,
}

/// Convergence report from the external single-peak fitting routine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitReport {
    /// Convergence status
    pub converged: bool,
    /// Optimizer termination message
    pub message: String,
    /// Number of function evaluations
    pub n_evaluations: usize,
}

/// Result of an external single-peak fit: best-fit parameters plus report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeakFit {
    /// Best-fit parameter record
    pub parameters: ParameterSet,
    /// Fit report
    pub report: FitReport,
}

/// Result of a parametric goodness-of-fit test (chi-square or deviance).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GofResult {
    /// Upper-tail p-value in `[0, 1]`.
    pub p_value: f64,
    /// Test statistic (non-negative).
    pub statistic: f64,
    /// Degrees of freedom: included bins minus free parameters.
    pub dof: usize,
    /// Number of included bins with expected count <= 5 — the chi-square
    /// approximation is unreliable when this is non-zero.
    pub low_count_bins: usize,
}

/// Result of the Monte-Carlo-resampled goodness-of-fit check.
///
/// Deliberately carries no statistic or degrees of freedom: this is a
/// resampling-based check, not a parametric one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MonteCarloResult {
    /// Fraction of valid samples whose best-fit log-likelihood is <= the
    /// observed best-fit log-likelihood.
    pub p_value: f64,
    /// Number of requested samples.
    pub n_samples: usize,
    /// Number of samples entering the p-value denominator.
    pub n_valid: usize,
    /// Number of samples excluded because the external refit failed.
    pub n_failed: usize,
    /// Number of valid samples whose refit did not converge.
    pub n_nonconverged: usize,
}

/// Per-bin residual diagnostics, restricted to bins with positive
/// expected count. All vectors are aligned and equal-length.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResidualResult {
    /// Raw residual `model - observed` per bin.
    pub residuals: Vec<f64>,
    /// Pearson-normalized residual `(model - observed) / sqrt(model)`.
    pub normalized: Vec<f64>,
    /// Two-tailed Poisson significance per bin, in `[0, 1]`.
    pub p_values: Vec<f64>,
    /// Bin centers for the included bins.
    pub centers: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn histogram_accessors_derive_centers_and_widths() {
        let h = Histogram::new(vec![0.0, 1.0, 3.0], vec![4.0, 9.0]).unwrap();
        assert_eq!(h.n_bins(), 2);
        assert_eq!(h.centers(), vec![0.5, 2.0]);
        assert_eq!(h.widths(), vec![1.0, 2.0]);
    }

    #[test]
    fn histogram_rejects_non_monotonic_edges() {
        let err = Histogram::new(vec![0.0, 2.0, 1.0], vec![1.0, 1.0]);
        assert!(matches!(err, Err(Error::Validation(_))));
    }

    #[test]
    fn histogram_rejects_length_mismatch() {
        let err = Histogram::new(vec![0.0, 1.0, 2.0], vec![1.0]);
        assert!(matches!(err, Err(Error::Validation(_))));
        let err = Histogram::new(vec![0.0], vec![]);
        assert!(matches!(err, Err(Error::Validation(_))));
    }

    #[test]
    fn histogram_rejects_negative_counts() {
        let err = Histogram::new(vec![0.0, 1.0], vec![-1.0]);
        assert!(matches!(err, Err(Error::Validation(_))));
    }

    #[test]
    fn with_counts_shares_edges() {
        let h = Histogram::new(vec![0.0, 1.0, 2.0], vec![3.0, 4.0]).unwrap();
        let s = h.with_counts(vec![5.0, 6.0]).unwrap();
        assert_eq!(s.edges(), h.edges());
        assert_eq!(s.counts(), &[5.0, 6.0]);
        // original untouched
        assert_eq!(h.counts(), &[3.0, 4.0]);
        assert!(h.with_counts(vec![1.0]).is_err());
    }

    #[test]
    fn parameter_set_insert_and_lookup() {
        let mut p = ParameterSet::new();
        p.insert("position".into(), 1460.8);
        p.insert("sigma".into(), 1.2);
        p.insert("position".into(), 1461.0);
        assert_eq!(p.len(), 2);
        assert_eq!(p.get("position"), Some(1461.0));
        assert_eq!(p.get("missing"), None);
    }
}
