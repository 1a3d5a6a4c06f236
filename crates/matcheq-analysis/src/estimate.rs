//! Spectral response estimation between a reference and a probe recording.
//!
//! The estimate is the average, over energetic STFT frames, of the
//! fractional-octave-smoothed dB ratio `probe / reference`. Both
//! spectrograms are first divided by their own global maximum, so the curve
//! describes spectral shape rather than absolute level.
//!
//! Frames are gated on the reference: a frame is kept only when its RMS is at
//! least `mean - std` of all reference frame RMS values, and only when both
//! smoothed spectra are strictly positive in every bin.

use crate::error::{AnalysisError, Result};
use crate::smoothing::{DEFAULT_BANDS_PER_OCTAVE, fractional_octave_smooth};
use crate::spectrogram::{Spectrogram, StftAnalyzer};
use matcheq_core::{AudioBuffer, amplitude_ratio_db};

/// Default STFT segment length.
pub const DEFAULT_WINDOW_SIZE: usize = 8192;

/// Estimator settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimatorConfig {
    /// STFT segment length (even)
    pub window_size: usize,
    /// Smoothing resolution, `3.0` for third-octave
    pub bands_per_octave: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            bands_per_octave: DEFAULT_BANDS_PER_OCTAVE,
        }
    }
}

/// Averaged dB deviation of a probe against its reference, per frequency bin.
#[derive(Debug, Clone, PartialEq)]
pub struct MagnitudeDifference {
    /// Bin centre frequencies in Hz
    pub frequencies: Vec<f64>,
    /// `20·log10(probe / reference)` per bin
    pub magnitude_db: Vec<f64>,
    /// Sample rate of the analysed signals
    pub sample_rate: f64,
    /// Total frames analysed (summed over pairs for a mean)
    pub frames: usize,
    /// Frames that passed the gate (summed over pairs for a mean)
    pub retained_frames: usize,
}

impl MagnitudeDifference {
    /// Unweighted mean of several curves.
    ///
    /// Every curve counts equally regardless of how many frames it was built
    /// from. All curves must share the frequency axis.
    pub fn mean(curves: &[MagnitudeDifference]) -> Result<MagnitudeDifference> {
        let Some(first) = curves.first() else {
            return Err(AnalysisError::InvalidParameter {
                name: "curves",
                reason: "cannot average an empty list".to_string(),
            });
        };

        let scale = 1.0 / curves.len() as f64;
        let mut magnitude_db = vec![0.0; first.magnitude_db.len()];
        let mut frames = 0;
        let mut retained_frames = 0;

        for curve in curves {
            if curve.sample_rate != first.sample_rate
                || curve.magnitude_db.len() != first.magnitude_db.len()
            {
                return Err(AnalysisError::IncompatibleSignals {
                    reason: format!(
                        "cannot average curves of {} bins at {} Hz and {} bins at {} Hz",
                        first.magnitude_db.len(),
                        first.sample_rate,
                        curve.magnitude_db.len(),
                        curve.sample_rate
                    ),
                });
            }
            for (acc, &v) in magnitude_db.iter_mut().zip(curve.magnitude_db.iter()) {
                *acc += v * scale;
            }
            frames += curve.frames;
            retained_frames += curve.retained_frames;
        }

        Ok(MagnitudeDifference {
            frequencies: first.frequencies.clone(),
            magnitude_db,
            sample_rate: first.sample_rate,
            frames,
            retained_frames,
        })
    }

    /// Number of frequency bins
    pub fn len(&self) -> usize {
        self.magnitude_db.len()
    }

    /// True if the curve has no bins
    pub fn is_empty(&self) -> bool {
        self.magnitude_db.is_empty()
    }

    /// Bin index for a frequency, using the curve's `bins / (fs / 2)` scale
    /// and truncating; clamped to the last bin.
    pub fn bin_index(&self, freq_hz: f64) -> usize {
        let idx = (freq_hz * self.len() as f64 / self.sample_rate * 2.0).max(0.0) as usize;
        idx.min(self.len().saturating_sub(1))
    }
}

/// Estimates the magnitude deviation of a reproduction path.
#[derive(Debug, Clone)]
pub struct ResponseEstimator {
    config: EstimatorConfig,
}

impl ResponseEstimator {
    /// Create an estimator, validating the configuration.
    pub fn new(config: EstimatorConfig) -> Result<Self> {
        if config.window_size < 16 || config.window_size % 2 != 0 {
            return Err(AnalysisError::InvalidParameter {
                name: "window_size",
                reason: format!("must be even and at least 16, got {}", config.window_size),
            });
        }
        if !(config.bands_per_octave.is_finite() && config.bands_per_octave > 0.0) {
            return Err(AnalysisError::InvalidParameter {
                name: "bands_per_octave",
                reason: format!("must be positive, got {}", config.bands_per_octave),
            });
        }
        Ok(Self { config })
    }

    /// Settings in use
    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Estimate from two (possibly multi-channel) buffers.
    ///
    /// Channels are averaged to mono and both signals are truncated to the
    /// shorter length.
    pub fn estimate(
        &self,
        reference: &AudioBuffer,
        probe: &AudioBuffer,
    ) -> Result<MagnitudeDifference> {
        if reference.sample_rate != probe.sample_rate {
            return Err(AnalysisError::IncompatibleSignals {
                reason: format!(
                    "sample rate mismatch: reference {} Hz, probe {} Hz",
                    reference.sample_rate, probe.sample_rate
                ),
            });
        }
        self.estimate_signals(
            &reference.to_mono(),
            &probe.to_mono(),
            reference.sample_rate as f64,
        )
    }

    /// Estimate from two mono signals sharing `sample_rate`.
    pub fn estimate_signals(
        &self,
        reference: &[f64],
        probe: &[f64],
        sample_rate: f64,
    ) -> Result<MagnitudeDifference> {
        let len = reference.len().min(probe.len());
        if len == 0 {
            return Err(AnalysisError::IncompatibleSignals {
                reason: "a signal is empty".to_string(),
            });
        }
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(AnalysisError::IncompatibleSignals {
                reason: format!("invalid sample rate {sample_rate}"),
            });
        }

        let analyzer = StftAnalyzer::default_for_sample_rate(sample_rate, self.config.window_size);
        let reference = analyzer.analyze(&reference[..len])?.normalize_peak();
        let probe = analyzer.analyze(&probe[..len])?.normalize_peak();

        self.compare(&reference, &probe)
    }

    /// Estimate the unweighted mean curve over several pairs.
    pub fn estimate_mean<'a, I>(&self, pairs: I) -> Result<MagnitudeDifference>
    where
        I: IntoIterator<Item = (&'a AudioBuffer, &'a AudioBuffer)>,
    {
        let curves = pairs
            .into_iter()
            .map(|(reference, probe)| self.estimate(reference, probe))
            .collect::<Result<Vec<_>>>()?;
        MagnitudeDifference::mean(&curves)
    }

    fn compare(
        &self,
        reference: &Spectrogram,
        probe: &Spectrogram,
    ) -> Result<MagnitudeDifference> {
        let frames = reference.num_frames();
        let rms = reference.frame_rms();
        let threshold = gate_threshold(&rms);

        let mut sum = vec![0.0; reference.num_bins()];
        let mut retained = 0usize;

        for (i, (ref_frame, probe_frame)) in reference.data.iter().zip(probe.data.iter()).enumerate() {
            if rms[i] < threshold {
                continue;
            }
            let smoothed_ref = fractional_octave_smooth(ref_frame, self.config.bands_per_octave)?;
            let smoothed_probe =
                fractional_octave_smooth(probe_frame, self.config.bands_per_octave)?;

            if smoothed_ref.iter().all(|&v| v > 0.0) && smoothed_probe.iter().all(|&v| v > 0.0) {
                for ((acc, &p), &r) in sum.iter_mut().zip(&smoothed_probe).zip(&smoothed_ref) {
                    *acc += amplitude_ratio_db(p, r);
                }
                retained += 1;
            }
        }

        tracing::debug!(frames, retained, threshold, "spectral gate");

        if retained == 0 {
            return Err(AnalysisError::InsufficientEnergy { frames, retained });
        }

        let scale = 1.0 / retained as f64;
        Ok(MagnitudeDifference {
            frequencies: reference.frequencies(),
            magnitude_db: sum.into_iter().map(|v| v * scale).collect(),
            sample_rate: reference.sample_rate,
            frames,
            retained_frames: retained,
        })
    }
}

/// Noise-gate level: mean minus (population) standard deviation.
pub fn gate_threshold(frame_rms: &[f64]) -> f64 {
    if frame_rms.is_empty() {
        return 0.0;
    }
    let n = frame_rms.len() as f64;
    let mean = frame_rms.iter().sum::<f64>() / n;
    let variance = frame_rms.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    mean - variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn tone(freq: f64, sample_rate: f64, len: usize, amplitude: f64) -> Vec<f64> {
        (0..len)
            .map(|i| amplitude * (2.0 * PI * freq * i as f64 / sample_rate).sin())
            .collect()
    }

    fn small_estimator() -> ResponseEstimator {
        ResponseEstimator::new(EstimatorConfig {
            window_size: 1024,
            bands_per_octave: 3.0,
        })
        .unwrap()
    }

    #[test]
    fn gate_threshold_is_mean_minus_std() {
        assert_eq!(gate_threshold(&[1.0, 3.0]), 1.0);
        assert_eq!(gate_threshold(&[2.0, 2.0, 2.0]), 2.0);
        assert_eq!(gate_threshold(&[]), 0.0);
    }

    #[test]
    fn rejects_bad_config() {
        let odd = EstimatorConfig {
            window_size: 1023,
            ..Default::default()
        };
        assert!(ResponseEstimator::new(odd).is_err());
        let frac = EstimatorConfig {
            bands_per_octave: -1.0,
            ..Default::default()
        };
        assert!(ResponseEstimator::new(frac).is_err());
    }

    #[test]
    fn identical_signals_give_flat_curve() {
        let signal = tone(1000.0, 48000.0, 16000, 0.5);
        let curve = small_estimator()
            .estimate_signals(&signal, &signal, 48000.0)
            .unwrap();
        assert_eq!(curve.len(), 513);
        assert!(curve.magnitude_db.iter().all(|v| v.abs() < 1e-9));
        assert!(curve.retained_frames > 0);
    }

    #[test]
    fn level_difference_is_normalized_away() {
        let reference = tone(440.0, 48000.0, 16000, 0.5);
        let probe: Vec<f64> = reference.iter().map(|v| v * 0.1).collect();
        let curve = small_estimator()
            .estimate_signals(&reference, &probe, 48000.0)
            .unwrap();
        assert!(curve.magnitude_db.iter().all(|v| v.abs() < 1e-6));
    }

    #[test]
    fn sample_rate_mismatch_is_incompatible() {
        let a = AudioBuffer::from_mono(vec![0.0; 4096], 48000);
        let b = AudioBuffer::from_mono(vec![0.0; 4096], 44100);
        let err = small_estimator().estimate(&a, &b).unwrap_err();
        assert!(matches!(err, AnalysisError::IncompatibleSignals { .. }));
    }

    #[test]
    fn empty_signal_is_incompatible() {
        let err = small_estimator()
            .estimate_signals(&[], &[0.1; 2048], 48000.0)
            .unwrap_err();
        assert!(matches!(err, AnalysisError::IncompatibleSignals { .. }));
    }

    #[test]
    fn silence_has_insufficient_energy() {
        let silent = vec![0.0; 8192];
        let err = small_estimator()
            .estimate_signals(&silent, &silent, 48000.0)
            .unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::InsufficientEnergy { retained: 0, .. }
        ));
    }

    #[test]
    fn mean_of_opposite_curves_is_zero() {
        let up = MagnitudeDifference {
            frequencies: vec![0.0, 100.0, 200.0],
            magnitude_db: vec![1.5, -3.0, 0.25],
            sample_rate: 400.0,
            frames: 4,
            retained_frames: 3,
        };
        let mut down = up.clone();
        for v in &mut down.magnitude_db {
            *v = -*v;
        }

        let ab = MagnitudeDifference::mean(&[up.clone(), down.clone()]).unwrap();
        let ba = MagnitudeDifference::mean(&[down, up]).unwrap();
        assert!(ab.magnitude_db.iter().all(|&v| v == 0.0));
        assert_eq!(ab.magnitude_db, ba.magnitude_db);
        assert_eq!(ab.retained_frames, 6);
    }

    #[test]
    fn mean_rejects_mismatched_axes() {
        let a = MagnitudeDifference {
            frequencies: vec![0.0, 1.0],
            magnitude_db: vec![0.0, 0.0],
            sample_rate: 4.0,
            frames: 1,
            retained_frames: 1,
        };
        let mut b = a.clone();
        b.sample_rate = 8.0;
        assert!(MagnitudeDifference::mean(&[a, b]).is_err());
        assert!(MagnitudeDifference::mean(&[]).is_err());
    }

    #[test]
    fn bin_index_uses_bins_over_nyquist() {
        let curve = MagnitudeDifference {
            frequencies: vec![0.0; 4097],
            magnitude_db: vec![0.0; 4097],
            sample_rate: 48000.0,
            frames: 1,
            retained_frames: 1,
        };
        assert_eq!(curve.bin_index(20.0), 3);
        assert_eq!(curve.bin_index(16000.0), 2731);
        assert_eq!(curve.bin_index(30000.0), 4096);
    }
}
