//! Applying a correction filter with an optional loudness-matching gain.

use crate::convolve::convolve;
use crate::error::Result;
use crate::loudness::{integrated_loudness, loudness_gain};
use matcheq_core::AudioBuffer;

/// How the convolved signal is scaled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CorrectionGain {
    /// Leave the convolved signal as is
    Unity,
    /// Multiply by a precomputed gain (batch reuse of a calibration gain)
    Fixed(f64),
    /// Measure the convolved signal and match this integrated loudness
    MatchLoudness {
        /// Target loudness in LUFS
        target_lufs: f64,
    },
}

/// A corrected signal and the gain that was applied to it.
#[derive(Debug, Clone)]
pub struct Correction {
    /// Corrected audio, `len + taps - 1` samples per channel
    pub buffer: AudioBuffer,
    /// Linear gain applied after convolution
    pub gain: f64,
}

/// Convolve every channel with the filter taps.
pub fn convolve_channels(signal: &AudioBuffer, taps: &[f64]) -> AudioBuffer {
    AudioBuffer::new(
        signal
            .channels
            .iter()
            .map(|channel| convolve(channel, taps))
            .collect(),
        signal.sample_rate,
    )
}

/// Convolve `signal` with `taps` and scale it according to `gain`.
pub fn apply_correction(
    signal: &AudioBuffer,
    taps: &[f64],
    gain: CorrectionGain,
) -> Result<Correction> {
    let mut buffer = convolve_channels(signal, taps);
    let gain = match gain {
        CorrectionGain::Unity => 1.0,
        CorrectionGain::Fixed(g) => g,
        CorrectionGain::MatchLoudness { target_lufs } => {
            loudness_gain(target_lufs, integrated_loudness(&buffer)?)
        }
    };
    buffer.scale(gain);
    Ok(Correction { buffer, gain })
}

/// Gain that makes `signal`, once filtered, as loud as `reference`.
///
/// Nothing is written or returned besides the gain; this is the calibration
/// step whose result is reused with [`CorrectionGain::Fixed`].
pub fn calibration_gain(signal: &AudioBuffer, taps: &[f64], reference: &AudioBuffer) -> Result<f64> {
    let target_lufs = integrated_loudness(reference)?;
    let filtered = convolve_channels(signal, taps);
    Ok(loudness_gain(target_lufs, integrated_loudness(&filtered)?))
}
