//! Error types for the localization routine

use crate::common::types::SweepPhase;
use std::time::Duration;

/// Result type alias
pub type Result<T> = std::result::Result<T, LocalizationError>;

/// Localization error types
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LocalizationError {
    /// The sweep finished, or the phase ran out of time, without seeing the edge
    #[error("wall not found during {phase} after {elapsed:?}")]
    WallNotFound {
        /// Phase that failed to find its edge
        phase: SweepPhase,
        /// Time spent in that phase
        elapsed: Duration,
    },

    /// A wait was cancelled before it completed
    #[error("localization aborted")]
    Aborted,

    /// Correction requested before both edge headings were captured
    #[error("incomplete sweep: {0}")]
    IncompleteSweep(&'static str),

    /// Invalid configuration parameter
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}
