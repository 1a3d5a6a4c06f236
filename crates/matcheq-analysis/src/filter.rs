//! Zero-phase FIR filtering.
//!
//! [`filtfilt_fir`] runs an FIR filter forward and then backward over a
//! sequence, so the result has no phase shift and the magnitude response is
//! applied twice. Edges are handled with odd reflection plus steady-state
//! initial conditions, which keeps a constant input constant (scaled by the
//! squared DC gain) right up to the ends.

/// Symmetric Gaussian window of `len` points with standard deviation `std`
/// (in samples).
pub fn gaussian_window(len: usize, std: f64) -> Vec<f64> {
    let centre = (len as f64 - 1.0) / 2.0;
    (0..len)
        .map(|i| {
            let n = i as f64 - centre;
            (-(n * n) / (2.0 * std * std)).exp()
        })
        .collect()
}

/// Forward-backward FIR filtering of `x` with coefficients `b`.
///
/// The input is extended at both ends by odd reflection of `3 * b.len()`
/// samples (clamped to `x.len() - 1`), filtered in each direction starting
/// from the steady state of the first sample, then trimmed back to
/// `x.len()`.
pub fn filtfilt_fir(b: &[f64], x: &[f64]) -> Vec<f64> {
    if x.is_empty() || b.is_empty() {
        return x.to_vec();
    }
    let n = x.len();
    let padlen = (3 * b.len()).min(n - 1);

    let first = x[0];
    let last = x[n - 1];
    let mut ext = Vec::with_capacity(n + 2 * padlen);
    ext.extend((1..=padlen).rev().map(|i| 2.0 * first - x[i]));
    ext.extend_from_slice(x);
    ext.extend((1..=padlen).map(|i| 2.0 * last - x[n - 1 - i]));

    let mut y = lfilter_steady(b, &ext);
    y.reverse();
    let mut y = lfilter_steady(b, &y);
    y.reverse();

    y[padlen..padlen + n].to_vec()
}

/// Causal FIR filtering assuming the input was constant at `x[0]` for all
/// time before the first sample.
fn lfilter_steady(b: &[f64], x: &[f64]) -> Vec<f64> {
    let x0 = x[0];
    (0..x.len())
        .map(|i| {
            b.iter()
                .enumerate()
                .map(|(j, &bj)| bj * if j <= i { x[i - j] } else { x0 })
                .sum()
        })
        .collect()
}
