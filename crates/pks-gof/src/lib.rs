//! # pks-gof
//!
//! Goodness-of-fit diagnostics for gamma-ray peak fits.
//!
//! This crate provides:
//! - Pearson chi-square and likelihood-ratio (deviance) p-values for a
//!   fitted peakshape against a binned spectrum
//! - Monte-Carlo-resampled p-values driving an external re-fitter
//! - Per-bin residuals with Poisson-tail significance
//! - Energy-calibration configuration helpers
//!
//! ## Architecture
//!
//! The peakshape model and the expensive re-fitting routine arrive
//! through the `pks-core` traits; this crate never depends on a concrete
//! optimizer.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Bin geometry extraction and the shared bin-inclusion policy.
pub mod binning;
/// Energy-calibration configuration helpers.
pub mod calibration;
/// Pearson chi-square goodness-of-fit.
pub mod chi2;
/// Likelihood-ratio (Poisson deviance) goodness-of-fit.
pub mod deviance;
/// Binned Poisson log-likelihood scoring.
pub mod likelihood;
/// Expected-count evaluation on a bin grid.
pub mod model;
/// Monte-Carlo-resampled goodness-of-fit.
pub mod montecarlo;
/// Reference gamma-ray peakshape.
pub mod peakshape;
/// Per-bin residuals and significance.
pub mod residuals;

pub use binning::BinData;
pub use calibration::{detector_config, peak_windows, PeakLineConfig};
pub use chi2::chi_square_gof;
pub use deviance::likelihood_ratio_gof;
pub use likelihood::poisson_log_likelihood;
pub use model::expected_counts;
pub use montecarlo::{monte_carlo_gof, MonteCarloConfig, DEFAULT_N_SAMPLES, REFIT_PARAM_NAMES};
pub use peakshape::GaussStepTail;
pub use residuals::residual_analysis;
