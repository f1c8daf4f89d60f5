//! Reference gamma-ray peakshape: Gaussian core, low-energy exponential
//! tail, erfc step, and flat background.
//!
//! This is the shape the canonical refit parameter record describes:
//! `position`, `sigma`, `amplitude`, `step_amplitude`, `skew_fraction`,
//! `skew_width`, `background`.

use pks_core::traits::PeakshapeModel;
use pks_core::ParameterSet;
use statrs::function::erf::erfc;
use std::f64::consts::SQRT_2;

const SQRT_2PI: f64 = 2.506_628_274_631_000_5;

/// Gaussian + tail + step + background peakshape with the canonical
/// seven-parameter record.
///
/// The Gaussian core and the exponential tail are unit-normalized, so
/// `amplitude` is the total signal count density integral; `skew_fraction`
/// splits it between the two. Missing parameters default to zero (no
/// tail, no step, no background); a non-positive `sigma` yields only the
/// background level.
#[derive(Debug, Clone, Copy, Default)]
pub struct GaussStepTail;

impl GaussStepTail {
    fn gauss(dx: f64, sigma: f64) -> f64 {
        (-0.5 * (dx / sigma) * (dx / sigma)).exp() / (sigma * SQRT_2PI)
    }

    fn tail(dx: f64, sigma: f64, tau: f64) -> f64 {
        // Unit-normalized low-energy exponential tail convolved with the
        // Gaussian resolution. The exponent is clamped so the product
        // with the vanishing erfc stays finite on the high side.
        let arg = (dx / tau + 0.5 * (sigma / tau) * (sigma / tau)).clamp(-700.0, 700.0);
        arg.exp() * erfc(dx / (sigma * SQRT_2) + sigma / (tau * SQRT_2)) / (2.0 * tau)
    }

    fn step(dx: f64, sigma: f64) -> f64 {
        0.5 * erfc(dx / (sigma * SQRT_2))
    }
}

impl PeakshapeModel for GaussStepTail {
    fn density(&self, energy: f64, params: &ParameterSet) -> f64 {
        let background = params.get("background").unwrap_or(0.0);
        let position = match params.get("position") {
            Some(v) => v,
            None => return background.max(0.0),
        };
        let sigma = params.get("sigma").unwrap_or(0.0);
        if sigma <= 0.0 {
            return background.max(0.0);
        }

        let amplitude = params.get("amplitude").unwrap_or(0.0);
        let step_amplitude = params.get("step_amplitude").unwrap_or(0.0);
        let skew_fraction = params.get("skew_fraction").unwrap_or(0.0).clamp(0.0, 1.0);
        let skew_width = params.get("skew_width").unwrap_or(0.0);

        let dx = energy - position;
        let mut density = background + step_amplitude * Self::step(dx, sigma);
        density += amplitude * (1.0 - skew_fraction) * Self::gauss(dx, sigma);
        if skew_fraction > 0.0 && skew_width > 0.0 {
            density += amplitude * skew_fraction * Self::tail(dx, sigma, skew_width);
        }
        density.max(0.0)
    }
}
