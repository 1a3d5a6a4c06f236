//! Error types for spectral analysis and filter design.

use thiserror::Error;

/// Result type for analysis operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors that can occur while estimating, designing or applying a
/// correction.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Reference and probe cannot be compared
    #[error("incompatible signals: {reason}")]
    IncompatibleSignals {
        /// What made the pair incomparable.
        reason: String,
    },

    /// No spectrogram frame carried enough energy to contribute
    #[error("insufficient energy: {retained} of {frames} frames usable")]
    InsufficientEnergy {
        /// Number of frames analysed.
        frames: usize,
        /// Number of frames that passed the gate (always 0 when raised).
        retained: usize,
    },

    /// Filter length must be odd and positive
    #[error("invalid filter length {0}: must be odd and positive")]
    InvalidFilterLength(usize),

    /// A numeric parameter is out of range
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// The least-squares normal equations could not be solved
    #[error("least-squares system is singular")]
    SingularSystem,

    /// Loudness meter failure
    #[error("loudness measurement failed: {0}")]
    Loudness(String),
}

impl From<ebur128::Error> for AnalysisError {
    fn from(err: ebur128::Error) -> Self {
        Self::Loudness(format!("{:?}", err))
    }
}
