//! Error types for PeakStat

use thiserror::Error;

/// PeakStat error type
#[derive(Error, Debug)]
pub enum Error {
    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Validation error (malformed histogram, degenerate degrees of freedom,
    /// invalid sample count)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Computation error
    #[error("Computation error: {0}")]
    Computation(String),

    /// External peak-fit failure
    #[error("Fit failure: {0}")]
    FitFailed(String),

    /// Operation aborted via a cancellation flag
    #[error("Cancelled: {0}")]
    Cancelled(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
