//! Integrated loudness (ITU-R BS.1770 / EBU R128) via the `ebur128` crate.

use crate::error::{AnalysisError, Result};
use ebur128::{EbuR128, Mode};
use matcheq_core::{AudioBuffer, db_to_linear};

/// Integrated, gated loudness of a buffer in LUFS.
///
/// Fails with [`AnalysisError::Loudness`] when the signal has no gating block
/// above the absolute gate (silence, or shorter than one 400 ms block).
pub fn integrated_loudness(buffer: &AudioBuffer) -> Result<f64> {
    if buffer.num_channels() == 0 {
        return Err(AnalysisError::Loudness("buffer has no channels".to_string()));
    }

    let mut meter = EbuR128::new(buffer.num_channels() as u32, buffer.sample_rate, Mode::I)?;
    meter.add_frames_f64(&buffer.to_interleaved())?;
    let lufs = meter.loudness_global()?;

    if !lufs.is_finite() {
        return Err(AnalysisError::Loudness(format!(
            "no measurable loudness in {:.3}s of audio",
            buffer.duration_secs()
        )));
    }
    Ok(lufs)
}

/// Linear gain that moves a signal measured at `signal_lufs` to
/// `target_lufs`.
pub fn loudness_gain(target_lufs: f64, signal_lufs: f64) -> f64 {
    db_to_linear(target_lufs - signal_lufs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn tone(amplitude: f64, seconds: f64) -> AudioBuffer {
        let fs = 48000;
        let n = (seconds * fs as f64) as usize;
        AudioBuffer::from_mono(
            (0..n)
                .map(|i| amplitude * (2.0 * PI * 1000.0 * i as f64 / fs as f64).sin())
                .collect(),
            fs,
        )
    }

    #[test]
    fn halving_amplitude_drops_six_db() {
        let loud = integrated_loudness(&tone(0.5, 3.0)).unwrap();
        let quiet = integrated_loudness(&tone(0.25, 3.0)).unwrap();
        assert!((loud - quiet - 6.0206).abs() < 0.05, "{loud} vs {quiet}");
    }

    #[test]
    fn gain_restores_level() {
        let gain = loudness_gain(-20.0, -26.0);
        assert!((gain - 1.9953).abs() < 1e-3);
        assert_eq!(loudness_gain(-23.0, -23.0), 1.0);
    }

    #[test]
    fn silence_is_an_error() {
        let silent = AudioBuffer::from_mono(vec![0.0; 96000], 48000);
        assert!(matches!(
            integrated_loudness(&silent),
            Err(AnalysisError::Loudness(_))
        ));
    }
}
