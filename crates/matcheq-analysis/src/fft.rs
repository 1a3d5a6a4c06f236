//! FFT wrapper with windowing functions

use rustfft::{FftPlanner, num_complex::Complex64};
use std::f64::consts::PI;
use std::sync::Arc;

/// Window function types
///
/// All windows are periodic (DFT-even): a window of length `n` is the first
/// `n` points of the symmetric window of length `n + 1`, which is what
/// spectral analysis expects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Window {
    /// Rectangular (no windowing)
    Rectangular,
    /// Hann window (raised cosine)
    Hann,
    /// Tukey (tapered cosine) window; the value is the taper fraction in `[0, 1]`
    Tukey(f64),
}

impl Default for Window {
    /// Tukey with a 25% taper, the usual spectrogram default.
    fn default() -> Self {
        Window::Tukey(0.25)
    }
}

impl Window {
    /// Get window coefficients
    pub fn coefficients(&self, size: usize) -> Vec<f64> {
        match *self {
            Window::Rectangular => vec![1.0; size],
            Window::Hann => (0..size)
                .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f64 / size as f64).cos()))
                .collect(),
            Window::Tukey(alpha) => {
                let mut w = tukey_symmetric(size + 1, alpha);
                w.truncate(size);
                w
            }
        }
    }
}

/// Symmetric Tukey window of length `m`.
fn tukey_symmetric(m: usize, alpha: f64) -> Vec<f64> {
    if m <= 1 {
        return vec![1.0; m];
    }
    if alpha <= 0.0 {
        return vec![1.0; m];
    }
    if alpha >= 1.0 {
        return (0..m)
            .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f64 / (m - 1) as f64).cos()))
            .collect();
    }

    let last = (m - 1) as f64;
    let width = (alpha * last / 2.0).floor() as usize;

    (0..m)
        .map(|i| {
            let n = i as f64;
            if i <= width {
                0.5 * (1.0 + (PI * (-1.0 + 2.0 * n / alpha / last)).cos())
            } else if i < m - width - 1 {
                1.0
            } else {
                0.5 * (1.0 + (PI * (-2.0 / alpha + 1.0 + 2.0 * n / alpha / last)).cos())
            }
        })
        .collect()
}

/// Planned forward/inverse real FFT pair of a fixed size
pub struct Fft {
    fft: Arc<dyn rustfft::Fft<f64>>,
    ifft: Arc<dyn rustfft::Fft<f64>>,
    size: usize,
}

impl Fft {
    /// Create a new FFT processor for the given size
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        let ifft = planner.plan_fft_inverse(size);

        Self {
            fft,
            ifft,
            size,
        }
    }

    /// Get FFT size
    pub fn size(&self) -> usize {
        self.size
    }

    /// Perform forward FFT on real input
    ///
    /// Input is zero-padded or truncated to the FFT size. Returns the
    /// one-sided spectrum (size/2 + 1 bins, DC to Nyquist).
    pub fn forward(&self, input: &[f64]) -> Vec<Complex64> {
        let mut buffer: Vec<Complex64> = input
            .iter()
            .take(self.size)
            .map(|&x| Complex64::new(x, 0.0))
            .collect();
        buffer.resize(self.size, Complex64::new(0.0, 0.0));

        self.fft.process(&mut buffer);

        buffer.truncate(self.size / 2 + 1);
        buffer
    }

    /// Inverse of [`Fft::forward`]: one-sided spectrum in, real signal out
    pub fn inverse(&self, spectrum: &[Complex64]) -> Vec<f64> {
        let mut buffer = vec![Complex64::new(0.0, 0.0); self.size];
        for (i, &c) in spectrum.iter().take(self.size / 2 + 1).enumerate() {
            buffer[i] = c;
            if i > 0 && i < self.size - i {
                buffer[self.size - i] = c.conj();
            }
        }

        self.ifft.process(&mut buffer);

        let scale = 1.0 / self.size as f64;
        buffer.iter().map(|c| c.re * scale).collect()
    }
}

/// Frequencies (Hz) of the one-sided bins of an `n`-point real FFT.
pub fn rfft_frequencies(n: usize, sample_rate: f64) -> Vec<f64> {
    (0..=n / 2)
        .map(|k| k as f64 * sample_rate / n as f64)
        .collect()
}
