//! Expected-count evaluation of a peakshape model on a bin grid.

use crate::binning::BinData;
use pks_core::traits::PeakshapeModel;
use pks_core::ParameterSet;

/// Expected count per bin: `width * density(center, params)`.
///
/// Deterministic and pure. Densities may be zero or near-zero at bin
/// centers far from the peak; that is expected, not an error.
pub fn expected_counts<M: PeakshapeModel + ?Sized>(
    model: &M,
    params: &ParameterSet,
    bins: &BinData,
) -> Vec<f64> {
    bins.centers
        .iter()
        .zip(bins.widths.iter())
        .map(|(&center, &width)| width * model.density(center, params))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pks_core::Histogram;

    #[test]
    fn expected_counts_scale_by_bin_width() {
        let hist = Histogram::new(vec![0.0, 1.0, 3.0], vec![0.0, 0.0]).unwrap();
        let bins = BinData::from_histogram(&hist);
        let flat = |_e: f64, _p: &ParameterSet| 4.0;
        let expected = expected_counts(&flat, &ParameterSet::new(), &bins);
        assert_eq!(expected, vec![4.0, 8.0]);
    }

    #[test]
    fn expected_counts_evaluate_at_bin_centers() {
        let hist = Histogram::new(vec![0.0, 2.0, 4.0], vec![0.0, 0.0]).unwrap();
        let bins = BinData::from_histogram(&hist);
        let linear = |e: f64, _p: &ParameterSet| e;
        let expected = expected_counts(&linear, &ParameterSet::new(), &bins);
        assert_eq!(expected, vec![2.0, 6.0]);
    }
}
