//! Fractional-octave smoothing of one-sided spectra.
//!
//! Amplitude smoothing with a resolution that is constant per octave:
//!
//! 1. resample the magnitudes from the linear bin axis to a logarithmic one
//!    (cubic spline),
//! 2. run a Gaussian window forward-backward over the log-spaced sequence,
//!    with the ends extended by repeating the edge values,
//! 3. resample back to the linear axis (linear interpolation).
//!
//! On the log axis a fixed-length window covers a fixed fraction of an
//! octave, so low frequencies keep their detail while the dense comb
//! ripple at high frequencies is averaged out.

use crate::error::{AnalysisError, Result};
use crate::filter::{filtfilt_fir, gaussian_window};
use crate::interp::{CubicSpline, linear_interp};
use rustfft::num_complex::Complex64;

/// Default smoothing resolution: third-octave.
pub const DEFAULT_BANDS_PER_OCTAVE: f64 = 3.0;

/// Geometry of the smoothing window for a given spectrum length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingKernel {
    /// Even number of log-spaced bins spanned by one smoothing band (≥ 2)
    pub bins_per_band: usize,
    /// Gaussian window length (`2 * bins_per_band`)
    pub window_len: usize,
    /// Gaussian standard deviation in log bins
    pub std: f64,
}

impl SmoothingKernel {
    /// Kernel for a spectrum of `num_bins` one-sided bins smoothed to
    /// `1 / bands_per_octave` octave.
    pub fn new(num_bins: usize, bands_per_octave: f64) -> Result<Self> {
        if num_bins < 3 {
            return Err(AnalysisError::InvalidParameter {
                name: "num_bins",
                reason: format!("need at least 3 bins to smooth, got {num_bins}"),
            });
        }
        if !(bands_per_octave.is_finite() && bands_per_octave > 0.0) {
            return Err(AnalysisError::InvalidParameter {
                name: "bands_per_octave",
                reason: format!("must be positive, got {bands_per_octave}"),
            });
        }

        // ratio between consecutive log bins spanning bins 1..num_bins
        let spacing_log10 = ((num_bins - 1) as f64).log10() / num_bins as f64;
        let bins_per_band = 2.0_f64.log10() / (bands_per_octave * spacing_log10);
        let bins_per_band = (((bins_per_band / 2.0).round() as usize) * 2).max(2);

        Ok(Self {
            bins_per_band,
            window_len: 2 * bins_per_band,
            std: bins_per_band as f64 / 2.5,
        })
    }
}

/// Smooth a one-sided magnitude spectrum.
///
/// Returns a vector of the same length. A flat input is returned flat.
pub fn fractional_octave_smooth(magnitude: &[f64], bands_per_octave: f64) -> Result<Vec<f64>> {
    let num_bins = magnitude.len();
    let kernel = SmoothingKernel::new(num_bins, bands_per_octave)?;

    let lin_bins: Vec<f64> = (0..num_bins).map(|i| i as f64).collect();
    let log_bins = log_bin_axis(num_bins);

    let on_log_axis = CubicSpline::new(&lin_bins, magnitude)?.eval_many(&log_bins);

    let window = gaussian_window(kernel.window_len, kernel.std);
    let pad = window.len();
    let first = on_log_axis[0];
    let last = on_log_axis[num_bins - 1];

    let mut padded = Vec::with_capacity(num_bins + 2 * pad);
    padded.extend(std::iter::repeat_n(first, pad));
    padded.extend_from_slice(&on_log_axis);
    padded.extend(std::iter::repeat_n(last, pad));

    let gain: f64 = window.iter().sum();
    let norm = gain * gain;
    let smoothed: Vec<f64> = filtfilt_fir(&window, &padded)[pad..pad + num_bins]
        .iter()
        .map(|v| v / norm)
        .collect();

    linear_interp(&log_bins, &smoothed, &lin_bins)
}

/// Smooth the magnitude of a complex one-sided spectrum.
pub fn fractional_octave_smooth_complex(
    spectrum: &[Complex64],
    bands_per_octave: f64,
) -> Result<Vec<f64>> {
    let magnitude: Vec<f64> = spectrum.iter().map(|c| c.norm()).collect();
    fractional_octave_smooth(&magnitude, bands_per_octave)
}

/// `num_bins` log-spaced positions from bin 1 to bin `num_bins - 1`.
fn log_bin_axis(num_bins: usize) -> Vec<f64> {
    let stop = ((num_bins - 1) as f64).log10();
    let step = stop / (num_bins - 1) as f64;
    (0..num_bins)
        .map(|i| 10f64.powf(i as f64 * step))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn kernel_for_8192_point_fft() {
        let kernel = SmoothingKernel::new(4097, 3.0).unwrap();
        assert_eq!(kernel.bins_per_band, 114);
        assert_eq!(kernel.window_len, 228);
        assert!((kernel.std - 45.6).abs() < 1e-12);
    }

    #[test]
    fn kernel_never_collapses() {
        let kernel = SmoothingKernel::new(16, 48.0).unwrap();
        assert_eq!(kernel.bins_per_band, 2);
    }

    #[test]
    fn log_axis_spans_bin_one_to_last() {
        let axis = log_bin_axis(1025);
        assert!((axis[0] - 1.0).abs() < 1e-12);
        assert!((axis[1024] - 1024.0).abs() < 1e-9);
        assert!(axis.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn flat_spectrum_stays_flat() {
        let out = fractional_octave_smooth(&vec![0.37; 4097], 3.0).unwrap();
        assert_eq!(out.len(), 4097);
        for v in out {
            assert!((v - 0.37).abs() < 1e-9, "{v}");
        }
    }

    #[test]
    fn comb_ripple_is_averaged_out() {
        let n = 2049;
        let comb: Vec<f64> = (0..n)
            .map(|k| 1.0 + 0.5 * (k as f64 * std::f64::consts::PI / 4.0).cos())
            .collect();
        let out = fractional_octave_smooth(&comb, 3.0).unwrap();

        // many ripple periods per third-octave, away from the top edge
        let band = &out[600..1500];
        let max = band.iter().cloned().fold(f64::MIN, f64::max);
        let min = band.iter().cloned().fold(f64::MAX, f64::min);
        assert!(max - min < 0.1, "residual ripple {}", max - min);
        assert!((band[400] - 1.0).abs() < 0.05);
    }

    #[test]
    fn complex_input_uses_magnitude() {
        let spectrum = vec![Complex64::new(0.0, -2.0); 513];
        let out = fractional_octave_smooth_complex(&spectrum, 3.0).unwrap();
        assert!(out.iter().all(|v| (v - 2.0).abs() < 1e-9));
    }

    #[test]
    fn invalid_fraction_is_rejected() {
        assert!(fractional_octave_smooth(&[1.0; 64], 0.0).is_err());
        assert!(fractional_octave_smooth(&[1.0; 2], 3.0).is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn flat_input_is_fixed_point(c in 1e-6f64..10.0, n in 64usize..600, frac in 1.0f64..12.0) {
            let out = fractional_octave_smooth(&vec![c; n], frac).unwrap();
            for v in out {
                prop_assert!((v - c).abs() < 1e-9 * c.max(1.0));
            }
        }
    }
}
