//! Inverse-filter design from a magnitude-difference curve.
//!
//! The measured deviation is clamped flat outside `[f_min, f_max]`, inverted
//! (`10^(-dB/20)`) and fitted with a least-squares linear-phase FIR. The
//! result is scaled so its largest tap is exactly ±1.

use crate::error::{AnalysisError, Result};
use crate::estimate::MagnitudeDifference;
use crate::firls::firls;
use matcheq_core::{db_to_linear, linear_to_db, peak_abs};

/// Default number of filter taps.
pub const DEFAULT_NTAPS: usize = 4097;
/// Default lower bound of the corrected band (Hz).
pub const DEFAULT_F_MIN: f64 = 20.0;
/// Default upper bound of the corrected band (Hz).
pub const DEFAULT_F_MAX: f64 = 16000.0;

/// Designer settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DesignConfig {
    /// Filter length (odd)
    pub ntaps: usize,
    /// Lower edge of the corrected band in Hz
    pub f_min: f64,
    /// Upper edge of the corrected band in Hz
    pub f_max: f64,
}

impl Default for DesignConfig {
    fn default() -> Self {
        Self {
            ntaps: DEFAULT_NTAPS,
            f_min: DEFAULT_F_MIN,
            f_max: DEFAULT_F_MAX,
        }
    }
}

/// Linear-phase FIR correction filter.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectionFilter {
    /// Symmetric filter coefficients, peak-normalised
    pub taps: Vec<f64>,
    /// Sample rate the filter was designed for
    pub sample_rate: f64,
}

impl CorrectionFilter {
    /// Number of taps
    pub fn len(&self) -> usize {
        self.taps.len()
    }

    /// True if the filter has no taps
    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }

    /// Group delay in samples, `(len - 1) / 2`
    pub fn delay(&self) -> usize {
        self.taps.len().saturating_sub(1) / 2
    }

    /// Magnitude response in dB at the given frequencies.
    ///
    /// Uses the zero-phase amplitude `h[M] + 2 Σ h[M+k] cos(kω)`, valid for
    /// the symmetric filters this module designs.
    pub fn response_db(&self, frequencies: &[f64]) -> Vec<f64> {
        let m = self.delay();
        frequencies
            .iter()
            .map(|&f| {
                let w = 2.0 * std::f64::consts::PI * f / self.sample_rate;
                let amplitude = self.taps[m]
                    + 2.0
                        * (1..=m)
                            .map(|k| self.taps[m + k] * (k as f64 * w).cos())
                            .sum::<f64>();
                linear_to_db(amplitude.abs())
            })
            .collect()
    }
}

/// Designs FIR filters that invert a measured deviation.
#[derive(Debug, Clone)]
pub struct InverseFilterDesigner {
    config: DesignConfig,
}

impl InverseFilterDesigner {
    /// Create a designer, validating the configuration.
    pub fn new(config: DesignConfig) -> Result<Self> {
        if config.ntaps == 0 || config.ntaps % 2 == 0 {
            return Err(AnalysisError::InvalidFilterLength(config.ntaps));
        }
        if !(config.f_min > 0.0 && config.f_min < config.f_max) {
            return Err(AnalysisError::InvalidParameter {
                name: "f_min",
                reason: format!(
                    "need 0 < f_min < f_max, got {} and {}",
                    config.f_min, config.f_max
                ),
            });
        }
        Ok(Self { config })
    }

    /// Settings in use
    pub fn config(&self) -> &DesignConfig {
        &self.config
    }

    /// Deviation curve with the bins outside `[f_min, f_max]` clamped to
    /// the values at the band edges.
    pub fn flatten_band_edges(&self, curve: &MagnitudeDifference) -> Vec<f64> {
        let mut mag = curve.magnitude_db.clone();
        if mag.is_empty() {
            return mag;
        }

        let nyquist = curve.sample_rate / 2.0;
        if self.config.f_max >= nyquist {
            tracing::warn!(
                f_max = self.config.f_max,
                nyquist,
                "upper band edge at or above Nyquist, clamped to last bin"
            );
        }

        let b_min = curve.bin_index(self.config.f_min);
        let b_max = curve.bin_index(self.config.f_max);
        let low = mag[b_min];
        let high = mag[b_max];
        mag[..b_min].fill(low);
        mag[b_max..].fill(high);
        mag
    }

    /// Linear amplitude target of the inverse filter per bin.
    pub fn inverse_target(&self, curve: &MagnitudeDifference) -> Vec<f64> {
        self.flatten_band_edges(curve)
            .iter()
            .map(|&db| db_to_linear(-db))
            .collect()
    }

    /// Design the correction filter.
    ///
    /// The DC bin is excluded from the fit; the remaining bins are used as
    /// consecutive band-edge pairs, so the curve must have an odd number of
    /// bins (the one-sided spectrum of an even-length FFT).
    pub fn design(&self, curve: &MagnitudeDifference) -> Result<CorrectionFilter> {
        if curve.len() < 3 || curve.len() % 2 == 0 || curve.frequencies.len() != curve.len() {
            return Err(AnalysisError::InvalidParameter {
                name: "curve",
                reason: format!(
                    "need an odd number (>= 3) of bins with matching frequencies, got {} bins and {} frequencies",
                    curve.len(),
                    curve.frequencies.len()
                ),
            });
        }

        let target = self.inverse_target(curve);
        let mut taps = firls(
            self.config.ntaps,
            &curve.frequencies[1..],
            &target[1..],
            curve.sample_rate,
        )?;

        let peak = peak_abs(&taps);
        if !(peak.is_finite() && peak > 0.0) {
            return Err(AnalysisError::SingularSystem);
        }
        for tap in &mut taps {
            *tap /= peak;
        }

        tracing::debug!(ntaps = taps.len(), "designed inverse filter");

        Ok(CorrectionFilter {
            taps,
            sample_rate: curve.sample_rate,
        })
    }
}
