//! Bin geometry extraction and the shared bin-inclusion policy.

use pks_core::Histogram;

/// Per-bin geometry and observed counts extracted once per GOF call.
#[derive(Debug, Clone)]
pub struct BinData {
    /// Bin centers.
    pub centers: Vec<f64>,
    /// Bin widths.
    pub widths: Vec<f64>,
    /// Observed counts.
    pub observed: Vec<f64>,
}

impl BinData {
    /// Extract centers, widths, and counts from a histogram.
    ///
    /// Edge/count invariants are enforced by the [`Histogram`]
    /// constructor, so a histogram value is valid by construction here.
    pub fn from_histogram(hist: &Histogram) -> Self {
        Self {
            centers: hist.centers(),
            widths: hist.widths(),
            observed: hist.counts().to_vec(),
        }
    }

    /// Number of bins.
    pub fn len(&self) -> usize {
        self.observed.len()
    }

    /// Whether there are no bins (cannot occur for a valid histogram).
    pub fn is_empty(&self) -> bool {
        self.observed.is_empty()
    }
}

/// Indices of bins with strictly positive expected count.
///
/// Every chi-square-family quantity (statistic, degrees of freedom,
/// residuals) is restricted to this index set: bins with zero expectation
/// would divide by zero, and excluding them is the documented
/// approximation, computed once per call and reused.
pub fn included_bins(expected: &[f64]) -> Vec<usize> {
    expected
        .iter()
        .enumerate()
        .filter_map(|(i, &m)| (m > 0.0).then_some(i))
        .collect()
}
