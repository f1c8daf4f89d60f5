//! # pks-core
//!
//! Core types and collaborator traits for PeakStat.
//!
//! This crate hosts everything the goodness-of-fit subsystem shares with
//! its collaborators: the error type, the histogram and parameter value
//! types, and the traits through which the external peakshape model and
//! peak-fitting routine are reached.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Error type and crate-wide `Result` alias.
pub mod error;
/// Collaborator traits: peakshape model and external peak fitter.
pub mod traits;
/// Shared value types: histogram, parameters, results.
pub mod types;

pub use error::{Error, Result};
pub use types::{
    FitReport, GofResult, Histogram, MonteCarloResult, ParameterSet, PeakFit, PeakSampleSpec,
    ResidualResult,
};
