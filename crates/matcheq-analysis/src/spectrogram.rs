//! STFT-based spectrogram generation
//!
//! [`StftAnalyzer`] produces complex one-sided frames with a periodic window,
//! per-segment mean removal, density scaling and no boundary padding.
//! The estimator only ever consumes magnitudes, so [`ComplexSpectrogram`]
//! converts into the magnitude-only [`Spectrogram`].

use crate::error::{AnalysisError, Result};
use crate::fft::{Fft, Window, rfft_frequencies};
use rustfft::num_complex::Complex64;

/// Magnitude spectrogram
#[derive(Debug, Clone)]
pub struct Spectrogram {
    /// 2D magnitude data `[time_frame][frequency_bin]`
    pub data: Vec<Vec<f64>>,
    /// FFT size used
    pub fft_size: usize,
    /// Hop size between frames
    pub hop_size: usize,
    /// Sample rate
    pub sample_rate: f64,
}

impl Spectrogram {
    /// Number of time frames
    pub fn num_frames(&self) -> usize {
        self.data.len()
    }

    /// Number of frequency bins (fft_size / 2 + 1)
    pub fn num_bins(&self) -> usize {
        self.fft_size / 2 + 1
    }

    /// Get frequency in Hz for a given bin index
    pub fn bin_to_freq(&self, bin: usize) -> f64 {
        bin as f64 * self.sample_rate / self.fft_size as f64
    }

    /// Frequency axis of the one-sided bins
    pub fn frequencies(&self) -> Vec<f64> {
        rfft_frequencies(self.fft_size, self.sample_rate)
    }

    /// Largest magnitude over the whole spectrogram
    pub fn max_magnitude(&self) -> f64 {
        self.data
            .iter()
            .flat_map(|frame| frame.iter())
            .fold(0.0, |acc, &m| acc.max(m))
    }

    /// Divide every bin by the global maximum magnitude.
    ///
    /// A spectrogram of pure silence is returned unchanged.
    pub fn normalize_peak(&self) -> Spectrogram {
        let max = self.max_magnitude();
        if max <= 0.0 {
            return self.clone();
        }

        Spectrogram {
            data: self
                .data
                .iter()
                .map(|frame| frame.iter().map(|&m| m / max).collect())
                .collect(),
            fft_size: self.fft_size,
            hop_size: self.hop_size,
            sample_rate: self.sample_rate,
        }
    }

    /// RMS of every frame, see [`one_sided_rms`]
    pub fn frame_rms(&self) -> Vec<f64> {
        self.data.iter().map(|frame| one_sided_rms(frame)).collect()
    }
}

/// Complex STFT frames
#[derive(Debug, Clone)]
pub struct ComplexSpectrogram {
    /// Complex bins `[time_frame][frequency_bin]`
    pub frames: Vec<Vec<Complex64>>,
    /// FFT size used
    pub fft_size: usize,
    /// Hop size between frames
    pub hop_size: usize,
    /// Sample rate
    pub sample_rate: f64,
}

impl ComplexSpectrogram {
    /// Number of time frames
    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    /// Convert to a magnitude spectrogram
    pub fn magnitude(&self) -> Spectrogram {
        Spectrogram {
            data: self
                .frames
                .iter()
                .map(|frame| frame.iter().map(|c| c.norm()).collect())
                .collect(),
            fft_size: self.fft_size,
            hop_size: self.hop_size,
            sample_rate: self.sample_rate,
        }
    }
}

/// RMS of a one-sided spectrum.
///
/// Non-DC, non-Nyquist bins stand for two bins of the full spectrum, so their
/// energy is counted twice: `sqrt((Σ|X|² + Σ|X[1..n-1]|²) / n_fft)` with
/// `n_fft = 2 * (bins - 1)`.
pub fn one_sided_rms(spectrum: &[f64]) -> f64 {
    if spectrum.len() < 2 {
        return spectrum.first().map_or(0.0, |x| x.abs());
    }
    let nfft = 2 * (spectrum.len() - 1);
    let total: f64 = spectrum.iter().map(|x| x * x).sum();
    let inner: f64 = spectrum[1..spectrum.len() - 1].iter().map(|x| x * x).sum();
    ((total + inner) / nfft as f64).sqrt()
}

/// STFT (Short-Time Fourier Transform) analyzer
pub struct StftAnalyzer {
    fft_size: usize,
    hop_size: usize,
    window: Window,
    sample_rate: f64,
    fft: Fft,
    window_coeffs: Vec<f64>,
    scale: f64,
}

impl StftAnalyzer {
    /// Create a new STFT analyzer
    ///
    /// # Arguments
    /// * `sample_rate` - Sample rate in Hz
    /// * `fft_size` - Segment length and FFT size
    /// * `hop_size` - Hop size between frames
    /// * `window` - Window function to use
    pub fn new(sample_rate: f64, fft_size: usize, hop_size: usize, window: Window) -> Self {
        let fft = Fft::new(fft_size);
        let window_coeffs = window.coefficients(fft_size);
        let energy: f64 = window_coeffs.iter().map(|w| w * w).sum();
        // density scaling; amplitude spectra take the square root
        let scale = if energy > 0.0 {
            (1.0 / (sample_rate * energy)).sqrt()
        } else {
            1.0
        };

        Self {
            fft_size,
            hop_size: hop_size.max(1),
            window,
            sample_rate,
            fft,
            window_coeffs,
            scale,
        }
    }

    /// Create analyzer with spectrogram defaults: Tukey(0.25) window and an
    /// overlap of one eighth of the segment.
    pub fn default_for_sample_rate(sample_rate: f64, fft_size: usize) -> Self {
        Self::new(
            sample_rate,
            fft_size,
            fft_size - fft_size / 8,
            Window::default(),
        )
    }

    /// Number of full frames that fit in `len` samples
    pub fn num_frames(&self, len: usize) -> usize {
        if len >= self.fft_size {
            (len - self.fft_size) / self.hop_size + 1
        } else {
            0
        }
    }

    /// Compute complex one-sided frames.
    ///
    /// Fails with [`AnalysisError::IncompatibleSignals`] if the signal is
    /// shorter than one segment.
    pub fn analyze_complex(&self, signal: &[f64]) -> Result<ComplexSpectrogram> {
        let num_frames = self.num_frames(signal.len());
        if num_frames == 0 {
            return Err(AnalysisError::IncompatibleSignals {
                reason: format!(
                    "signal of {} samples is shorter than the {}-sample analysis window",
                    signal.len(),
                    self.fft_size
                ),
            });
        }

        let mut frames = Vec::with_capacity(num_frames);
        for frame_idx in 0..num_frames {
            let start = frame_idx * self.hop_size;
            let segment = &signal[start..start + self.fft_size];

            // constant detrend
            let mean = segment.iter().sum::<f64>() / self.fft_size as f64;
            let windowed: Vec<f64> = segment
                .iter()
                .zip(self.window_coeffs.iter())
                .map(|(&s, &w)| (s - mean) * w)
                .collect();

            let spectrum: Vec<Complex64> = self
                .fft
                .forward(&windowed)
                .into_iter()
                .map(|c| c * self.scale)
                .collect();
            frames.push(spectrum);
        }

        Ok(ComplexSpectrogram {
            frames,
            fft_size: self.fft_size,
            hop_size: self.hop_size,
            sample_rate: self.sample_rate,
        })
    }

    /// Compute the magnitude spectrogram
    pub fn analyze(&self, signal: &[f64]) -> Result<Spectrogram> {
        Ok(self.analyze_complex(signal)?.magnitude())
    }

    /// Get FFT size
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Get hop size
    pub fn hop_size(&self) -> usize {
        self.hop_size
    }
}
