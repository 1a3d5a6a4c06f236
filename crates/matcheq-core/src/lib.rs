//! matcheq Core - shared primitives for spectrum matching
//!
//! This crate holds the small set of types every other matcheq crate agrees on:
//!
//! - [`AudioBuffer`] - multi-channel, non-interleaved `f64` audio with its sample rate
//! - [`db_to_linear`] / [`linear_to_db`] - level conversions
//! - [`amplitude_ratio_db`] - dB difference between two magnitudes
//!
//! Everything runs offline on whole files, so buffers are plain `Vec`s and
//! the math favours `f64` precision over speed.

pub mod buffer;
pub mod math;

pub use buffer::AudioBuffer;
pub use math::{amplitude_ratio_db, db_to_linear, linear_to_db, peak_abs};
