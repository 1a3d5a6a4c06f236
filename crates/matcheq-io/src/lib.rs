//! File I/O layer for matcheq.
//!
//! This crate provides:
//!
//! - **WAV file I/O**: [`read_wav`] and [`write_wav`] for multi-channel `f64` buffers,
//!   32-bit float for filters and 24-bit PCM for corrected audio
//! - **Naming**: [`naming`] derives artifact paths from their source files
//! - **Matching**: [`MatchEngine`] runs estimate → design → correct on files
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use matcheq_io::{FilePair, GainMode, MatchEngine};
//!
//! let engine = MatchEngine::new(Default::default(), Default::default())?;
//! let pair = FilePair::new("ref_file.wav", "pmx_file.wav");
//!
//! let artifact = engine.write_inverse_filter(&pair)?;
//! let gain = engine.calibration_gain(&[pair], &artifact.path)?;
//! engine.apply_correction("take1.wav".as_ref(), &artifact.path, &GainMode::Fixed(gain), "")?;
//! ```

mod engine;
pub mod naming;
mod wav;

pub use engine::{CorrectionArtifact, FilePair, FilterArtifact, GainMode, MatchEngine};
pub use wav::{WavFormat, WavInfo, WavSpec, read_wav, read_wav_info, write_wav};

/// Error types for file-level operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed or unsupported WAV data.
    #[error("WAV file error: {0}")]
    Wav(hound::Error),

    /// Estimation, design or correction failed.
    #[error(transparent)]
    Analysis(#[from] matcheq_analysis::AnalysisError),

    /// An operation that needs at least one file got none.
    #[error("no {0} given")]
    EmptyBatch(&'static str),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<hound::Error> for Error {
    /// File system failures inside hound surface as [`Error::Io`].
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(io) => Error::Io(io),
            other => Error::Wav(other),
        }
    }
}

/// Convenience result type for file-level operations.
pub type Result<T> = std::result::Result<T, Error>;
