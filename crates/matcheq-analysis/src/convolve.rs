//! Full linear convolution via FFT overlap-add.

use crate::fft::Fft;

/// Full (non-circular) convolution of `signal` with `kernel`.
///
/// The output has `signal.len() + kernel.len() - 1` samples (empty if either
/// input is empty). Long signals are processed in blocks, so memory stays
/// proportional to the kernel length.
pub fn convolve(signal: &[f64], kernel: &[f64]) -> Vec<f64> {
    if signal.is_empty() || kernel.is_empty() {
        return Vec::new();
    }
    let out_len = signal.len() + kernel.len() - 1;

    // direct form is cheaper for tiny kernels or signals
    if kernel.len().min(signal.len()) <= 32 {
        return convolve_direct(signal, kernel);
    }

    let fft_size = (4 * kernel.len()).next_power_of_two().max(1024);
    let block = fft_size - kernel.len() + 1;
    let fft = Fft::new(fft_size);
    let kernel_spectrum = fft.forward(kernel);

    let mut out = vec![0.0; out_len];
    for (b, chunk) in signal.chunks(block).enumerate() {
        let start = b * block;
        let spectrum: Vec<_> = fft
            .forward(chunk)
            .iter()
            .zip(kernel_spectrum.iter())
            .map(|(x, h)| x * h)
            .collect();
        let time = fft.inverse(&spectrum);

        let valid = chunk.len() + kernel.len() - 1;
        for (o, v) in out[start..start + valid].iter_mut().zip(time.iter()) {
            *o += v;
        }
    }
    out
}

fn convolve_direct(signal: &[f64], kernel: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; signal.len() + kernel.len() - 1];
    for (i, &s) in signal.iter().enumerate() {
        for (j, &k) in kernel.iter().enumerate() {
            out[i + j] += s * k;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_length_is_full() {
        assert_eq!(convolve(&[1.0; 10], &[1.0; 3]).len(), 12);
        assert_eq!(convolve(&[1.0; 5000], &[0.5; 257]).len(), 5256);
        assert!(convolve(&[], &[1.0]).is_empty());
    }

    #[test]
    fn direct_small_case() {
        assert_eq!(convolve(&[1.0, 2.0, 3.0], &[0.0, 1.0, 0.5]), vec![0.0, 1.0, 2.5, 4.0, 1.5]);
    }

    #[test]
    fn fft_path_matches_direct() {
        let signal: Vec<f64> = (0..3000).map(|i| ((i * 37) % 101) as f64 / 50.0 - 1.0).collect();
        let kernel: Vec<f64> = (0..129).map(|i| ((i * 13) % 17) as f64 / 17.0 - 0.4).collect();
        let fast = convolve(&signal, &kernel);
        let slow = convolve_direct(&signal, &kernel);
        assert_eq!(fast.len(), slow.len());
        for (a, b) in fast.iter().zip(slow.iter()) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn centred_impulse_delays_signal() {
        let mut kernel = vec![0.0; 65];
        kernel[32] = 1.0;
        let signal: Vec<f64> = (0..500).map(|i| (i as f64 * 0.1).sin()).collect();
        let out = convolve(&signal, &kernel);
        for (i, &s) in signal.iter().enumerate() {
            assert!((out[i + 32] - s).abs() < 1e-12);
        }
        assert!(out[..32].iter().all(|v| v.abs() < 1e-12));
    }
}
