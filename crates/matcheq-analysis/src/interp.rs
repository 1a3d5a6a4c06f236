//! One-dimensional interpolation with extrapolation.
//!
//! Both interpolators extend their outermost segment beyond the sample range
//! instead of failing, which is what the log-frequency resampling in
//! [`crate::smoothing`] needs at the spectrum edges.

use crate::error::{AnalysisError, Result};

/// Interpolating cubic spline with not-a-knot end conditions.
///
/// The third derivative is continuous across the second and the
/// second-to-last knots, so the first two and the last two segments are each
/// a single cubic. With fewer than four points the spline degrades to
/// piecewise-linear interpolation.
#[derive(Debug, Clone)]
pub struct CubicSpline {
    x: Vec<f64>,
    y: Vec<f64>,
    /// Second derivatives at the knots
    m: Vec<f64>,
}

impl CubicSpline {
    /// Fit a spline through `(x, y)`; `x` must be strictly increasing.
    pub fn new(x: &[f64], y: &[f64]) -> Result<Self> {
        validate_knots(x, y)?;
        let n = x.len();
        let m = if n < 4 {
            vec![0.0; n]
        } else {
            not_a_knot_second_derivatives(x, y)
        };

        Ok(Self {
            x: x.to_vec(),
            y: y.to_vec(),
            m,
        })
    }

    /// Evaluate at a single abscissa.
    pub fn eval(&self, xq: f64) -> f64 {
        let n = self.x.len();
        if n == 1 {
            return self.y[0];
        }
        let i = segment_index(&self.x, xq);
        let (x0, x1) = (self.x[i], self.x[i + 1]);
        let (y0, y1) = (self.y[i], self.y[i + 1]);
        let h = x1 - x0;

        if n < 4 {
            return y0 + (y1 - y0) * (xq - x0) / h;
        }

        let (m0, m1) = (self.m[i], self.m[i + 1]);
        let a = x1 - xq;
        let b = xq - x0;
        m0 * a * a * a / (6.0 * h)
            + m1 * b * b * b / (6.0 * h)
            + (y0 / h - m0 * h / 6.0) * a
            + (y1 / h - m1 * h / 6.0) * b
    }

    /// Evaluate at many abscissae.
    pub fn eval_many(&self, xq: &[f64]) -> Vec<f64> {
        xq.iter().map(|&x| self.eval(x)).collect()
    }
}

/// Piecewise-linear interpolation of `(x, y)` at `xq`, extrapolating from the
/// end segments.
pub fn linear_interp(x: &[f64], y: &[f64], xq: &[f64]) -> Result<Vec<f64>> {
    validate_knots(x, y)?;
    if x.len() == 1 {
        return Ok(vec![y[0]; xq.len()]);
    }

    Ok(xq
        .iter()
        .map(|&q| {
            let i = segment_index(x, q);
            let t = (q - x[i]) / (x[i + 1] - x[i]);
            y[i] + t * (y[i + 1] - y[i])
        })
        .collect())
}

fn validate_knots(x: &[f64], y: &[f64]) -> Result<()> {
    if x.is_empty() || x.len() != y.len() {
        return Err(AnalysisError::InvalidParameter {
            name: "x",
            reason: format!(
                "need matching non-empty knots, got {} x and {} y",
                x.len(),
                y.len()
            ),
        });
    }
    if x.windows(2).any(|w| w[1] <= w[0]) {
        return Err(AnalysisError::InvalidParameter {
            name: "x",
            reason: "knots must be strictly increasing".to_string(),
        });
    }
    Ok(())
}

/// Index `i` of the segment `[x[i], x[i+1]]` used for `q`, clamped to the
/// first and last segment for out-of-range queries.
fn segment_index(x: &[f64], q: f64) -> usize {
    let last_segment = x.len() - 2;
    match x.partition_point(|&v| v <= q) {
        0 => 0,
        p => (p - 1).min(last_segment),
    }
}

/// Solve for the knot second derivatives of a not-a-knot spline.
///
/// The two not-a-knot equations are eliminated into the first and last
/// interior rows, leaving a tridiagonal system in `M[1..n-1]` that is solved
/// with the Thomas algorithm.
fn not_a_knot_second_derivatives(x: &[f64], y: &[f64]) -> Vec<f64> {
    let n = x.len();
    let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
    let slope: Vec<f64> = (0..n - 1).map(|i| (y[i + 1] - y[i]) / h[i]).collect();

    // unknowns M[1] ..= M[n-2]
    let k = n - 2;
    let mut sub = vec![0.0; k];
    let mut diag = vec![0.0; k];
    let mut sup = vec![0.0; k];
    let mut rhs = vec![0.0; k];

    for r in 0..k {
        let i = r + 1;
        sub[r] = h[i - 1];
        diag[r] = 2.0 * (h[i - 1] + h[i]);
        sup[r] = h[i];
        rhs[r] = 6.0 * (slope[i] - slope[i - 1]);
    }

    // M0 = ((h0 + h1) M1 - h0 M2) / h1
    let (h0, h1) = (h[0], h[1]);
    diag[0] += h0 * (h0 + h1) / h1;
    sup[0] -= h0 * h0 / h1;
    // M[n-1] = ((h[n-2] + h[n-3]) M[n-2] - h[n-2] M[n-3]) / h[n-3]
    let (ha, hb) = (h[n - 3], h[n - 2]);
    diag[k - 1] += hb * (hb + ha) / ha;
    sub[k - 1] -= hb * hb / ha;

    let inner = solve_tridiagonal(&sub, &diag, &sup, &rhs);

    let mut m = vec![0.0; n];
    m[1..n - 1].copy_from_slice(&inner);
    m[0] = ((h0 + h1) * m[1] - h0 * m[2]) / h1;
    m[n - 1] = ((hb + ha) * m[n - 2] - hb * m[n - 3]) / ha;
    m
}

/// Thomas algorithm; `sub[0]` and `sup[n-1]` are ignored.
fn solve_tridiagonal(sub: &[f64], diag: &[f64], sup: &[f64], rhs: &[f64]) -> Vec<f64> {
    let n = diag.len();
    let mut c = vec![0.0; n];
    let mut d = vec![0.0; n];

    c[0] = sup[0] / diag[0];
    d[0] = rhs[0] / diag[0];
    for i in 1..n {
        let denom = diag[i] - sub[i] * c[i - 1];
        c[i] = if i + 1 < n { sup[i] / denom } else { 0.0 };
        d[i] = (rhs[i] - sub[i] * d[i - 1]) / denom;
    }

    let mut out = vec![0.0; n];
    out[n - 1] = d[n - 1];
    for i in (0..n - 1).rev() {
        out[i] = d[i] - c[i] * out[i + 1];
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn spline_reproduces_cubic_exactly() {
        // not-a-knot splines are exact for cubic polynomials
        let f = |x: f64| 0.5 * x * x * x - 2.0 * x * x + x - 3.0;
        let x: Vec<f64> = (0..12).map(|i| i as f64 * 0.7).collect();
        let y: Vec<f64> = x.iter().map(|&v| f(v)).collect();
        let spline = CubicSpline::new(&x, &y).unwrap();

        for q in [0.1, 1.33, 4.05, 7.6] {
            assert!((spline.eval(q) - f(q)).abs() < 1e-9, "at {q}");
        }
        // extrapolation follows the end cubic, which is the polynomial itself
        assert!((spline.eval(-0.5) - f(-0.5)).abs() < 1e-8);
        assert!((spline.eval(8.2) - f(8.2)).abs() < 1e-8);
    }

    #[test]
    fn spline_passes_through_knots() {
        let x = [0.0, 1.0, 2.5, 3.0, 4.5, 6.0];
        let y = [1.0, -1.0, 0.3, 2.0, 0.0, 0.5];
        let spline = CubicSpline::new(&x, &y).unwrap();
        for (xi, yi) in x.iter().zip(y.iter()) {
            assert!((spline.eval(*xi) - yi).abs() < 1e-12);
        }
    }

    #[test]
    fn short_input_falls_back_to_linear() {
        let spline = CubicSpline::new(&[0.0, 2.0], &[0.0, 4.0]).unwrap();
        assert_eq!(spline.eval(1.0), 2.0);
        assert_eq!(spline.eval(3.0), 6.0);
    }

    #[test]
    fn linear_extrapolates_both_ends() {
        let out = linear_interp(&[1.0, 2.0, 4.0], &[10.0, 20.0, 0.0], &[0.0, 1.5, 3.0, 5.0]).unwrap();
        assert_eq!(out, vec![0.0, 15.0, 10.0, -10.0]);
    }

    #[test]
    fn rejects_unsorted_knots() {
        assert!(CubicSpline::new(&[0.0, 2.0, 1.0], &[0.0; 3]).is_err());
        assert!(linear_interp(&[0.0, 1.0], &[0.0], &[0.5]).is_err());
    }

    proptest! {
        #[test]
        fn constant_data_stays_constant(c in -100.0f64..100.0, n in 4usize..64, q in -5.0f64..70.0) {
            let x: Vec<f64> = (0..n).map(|i| i as f64).collect();
            let y = vec![c; n];
            let spline = CubicSpline::new(&x, &y).unwrap();
            prop_assert!((spline.eval(q) - c).abs() < 1e-9 * (1.0 + c.abs()));
        }
    }
}
