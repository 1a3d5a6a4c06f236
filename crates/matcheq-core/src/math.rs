//! Level conversion helpers.
//!
//! All conversions use amplitude (20·log10) semantics; power quantities are
//! never stored in this workspace.

/// Convert decibels to linear gain.
///
/// # Example
/// ```rust
/// use matcheq_core::db_to_linear;
///
/// assert!((db_to_linear(0.0) - 1.0).abs() < 1e-12);
/// assert!((db_to_linear(-6.0206) - 0.5).abs() < 1e-4);
/// ```
#[inline]
pub fn db_to_linear(db: f64) -> f64 {
    10f64.powf(db / 20.0)
}

/// Convert linear gain to decibels.
///
/// Values at or below zero are floored at -200 dB rather than producing
/// `-inf`.
///
/// # Example
/// ```rust
/// use matcheq_core::linear_to_db;
///
/// assert!(linear_to_db(1.0).abs() < 1e-12);
/// assert!((linear_to_db(0.5) + 6.0206).abs() < 1e-4);
/// ```
#[inline]
pub fn linear_to_db(linear: f64) -> f64 {
    20.0 * linear.max(1e-10).log10()
}

/// `20·log10(numerator / denominator)` without flooring.
///
/// Callers must guarantee both values are strictly positive.
#[inline]
pub fn amplitude_ratio_db(numerator: f64, denominator: f64) -> f64 {
    20.0 * (numerator / denominator).log10()
}

/// Largest absolute sample value, `0.0` for an empty slice.
pub fn peak_abs(samples: &[f64]) -> f64 {
    samples.iter().fold(0.0, |acc, s| acc.max(s.abs()))
}
