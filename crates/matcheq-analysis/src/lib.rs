//! matcheq Analysis - estimate and invert the spectral deviation of a playback path
//!
//! The crate is organised as a pipeline of four stages plus the numerical
//! primitives they share:
//!
//! - [`smoothing`] - fractional-octave smoothing on a log-frequency axis
//! - [`estimate`] - averaged, energy-gated dB deviation of a probe vs. a reference
//! - [`design`] - least-squares linear-phase FIR that inverts a deviation
//! - [`correction`] - convolution with loudness-matched or fixed gain
//!
//! Supporting modules:
//!
//! - [`fft`] - FFT wrapper with windowing functions
//! - [`spectrogram`] - STFT analysis (density-scaled, no padding)
//! - [`interp`] - cubic spline and linear interpolation
//! - [`filter`] - Gaussian window and zero-phase FIR filtering
//! - [`firls`] - least-squares FIR design over piecewise-linear bands
//! - [`convolve`] - full linear convolution (direct or overlap-add)
//! - [`loudness`] - ITU-R BS.1770 integrated loudness
//! - [`export`] - CSV and FRD output
//!
//! ## Example Workflow
//!
//! ```rust,ignore
//! use matcheq_analysis::{
//!     CorrectionGain, DesignConfig, EstimatorConfig, InverseFilterDesigner, ResponseEstimator,
//!     apply_correction, integrated_loudness,
//! };
//!
//! // 1. Measure how the playback path colours the reference
//! let estimator = ResponseEstimator::new(EstimatorConfig::default())?;
//! let deviation = estimator.estimate(&reference, &recording)?;
//!
//! // 2. Design the inverse filter
//! let designer = InverseFilterDesigner::new(DesignConfig::default())?;
//! let filter = designer.design(&deviation)?;
//!
//! // 3. Pre-correct a stimulus, matching the reference loudness
//! let target_lufs = integrated_loudness(&reference)?;
//! let corrected = apply_correction(
//!     &stimulus,
//!     &filter.taps,
//!     CorrectionGain::MatchLoudness { target_lufs },
//! )?;
//! ```

pub mod convolve;
pub mod correction;
pub mod design;
pub mod error;
pub mod estimate;
pub mod export;
pub mod fft;
pub mod filter;
pub mod firls;
pub mod interp;
pub mod loudness;
pub mod smoothing;
pub mod spectrogram;

// Re-export main types
pub use convolve::convolve;
pub use correction::{Correction, CorrectionGain, apply_correction, calibration_gain, convolve_channels};
pub use design::{CorrectionFilter, DesignConfig, InverseFilterDesigner};
pub use error::{AnalysisError, Result};
pub use estimate::{EstimatorConfig, MagnitudeDifference, ResponseEstimator};
pub use fft::{Fft, Window};
pub use loudness::{integrated_loudness, loudness_gain};
pub use smoothing::{fractional_octave_smooth, fractional_octave_smooth_complex};
pub use spectrogram::{Spectrogram, StftAnalyzer};
