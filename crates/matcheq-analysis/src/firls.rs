//! Least-squares linear-phase FIR design.
//!
//! Designs an odd-length, symmetric (type I) FIR filter minimising the
//! integrated squared error against a piecewise-linear desired amplitude
//! response. Bands are given as consecutive `[start, stop]` edge pairs;
//! the spans between one band's stop and the next band's start do not
//! contribute to the error.

use crate::error::{AnalysisError, Result};
use std::f64::consts::PI;

/// Normalised sinc, `sin(πx) / (πx)`.
fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        let px = PI * x;
        px.sin() / px
    }
}

/// Design a linear-phase FIR filter by least squares.
///
/// # Arguments
/// * `numtaps` - Filter length, odd and positive
/// * `bands` - Band edges in Hz, an even number of non-decreasing values,
///   read as consecutive `[start, stop]` pairs within `[0, fs/2]`
/// * `desired` - Desired amplitude at each band edge (same length as `bands`)
/// * `sample_rate` - Sample rate in Hz
///
/// Returns `numtaps` symmetric coefficients.
pub fn firls(numtaps: usize, bands: &[f64], desired: &[f64], sample_rate: f64) -> Result<Vec<f64>> {
    if numtaps == 0 || numtaps % 2 == 0 {
        return Err(AnalysisError::InvalidFilterLength(numtaps));
    }
    if bands.is_empty() || bands.len() % 2 != 0 {
        return Err(AnalysisError::InvalidParameter {
            name: "bands",
            reason: format!("need an even, non-zero number of band edges, got {}", bands.len()),
        });
    }
    if desired.len() != bands.len() {
        return Err(AnalysisError::InvalidParameter {
            name: "desired",
            reason: format!(
                "expected {} desired values, got {}",
                bands.len(),
                desired.len()
            ),
        });
    }

    let nyquist = sample_rate / 2.0;
    let edges: Vec<f64> = bands.iter().map(|f| f / nyquist).collect();
    if edges.iter().any(|&e| !(0.0..=1.0).contains(&e)) {
        return Err(AnalysisError::InvalidParameter {
            name: "bands",
            reason: "band edges must lie between 0 and the Nyquist frequency".to_string(),
        });
    }
    if edges.windows(2).any(|w| w[1] < w[0]) {
        return Err(AnalysisError::InvalidParameter {
            name: "bands",
            reason: "band edges must be non-decreasing".to_string(),
        });
    }

    let m = (numtaps - 1) / 2;
    let pairs: Vec<(f64, f64, f64, f64)> = edges
        .chunks_exact(2)
        .zip(desired.chunks_exact(2))
        .filter(|(b, _)| b[1] > b[0])
        .map(|(b, d)| (b[0], b[1], d[0], d[1]))
        .collect();

    // q[n] = Σ_bands (f1·sinc(f1·n) - f0·sinc(f0·n)), n = 0..numtaps
    let q: Vec<f64> = (0..numtaps)
        .map(|n| {
            let n = n as f64;
            pairs
                .iter()
                .map(|&(f0, f1, _, _)| f1 * sinc(f1 * n) - f0 * sinc(f0 * n))
                .sum()
        })
        .collect();

    // Q = toeplitz(q[..=m]) + hankel(q[..=m], q[m..])
    let size = m + 1;
    let mut matrix = vec![0.0; size * size];
    for i in 0..size {
        for j in 0..size {
            matrix[i * size + j] = q[i.abs_diff(j)] + q[i + j];
        }
    }

    let rhs: Vec<f64> = (0..size)
        .map(|n| {
            let nf = n as f64;
            pairs
                .iter()
                .map(|&(f0, f1, d0, d1)| {
                    let slope = (d1 - d0) / (f1 - f0);
                    let intercept = d0 - f0 * slope;
                    let term = |f: f64| {
                        let mut t = f * (slope * f + intercept) * sinc(f * nf);
                        if n == 0 {
                            t -= slope * f * f / 2.0;
                        } else {
                            let pn = PI * nf;
                            t += slope * (pn * f).cos() / (pn * pn);
                        }
                        t
                    };
                    term(f1) - term(f0)
                })
                .sum()
        })
        .collect();

    let a = solve_symmetric(matrix, rhs, size)?;

    let mut coeffs = Vec::with_capacity(numtaps);
    coeffs.extend(a[1..].iter().rev());
    coeffs.push(2.0 * a[0]);
    coeffs.extend_from_slice(&a[1..]);
    Ok(coeffs)
}

/// Solve `A x = b` for symmetric `A` (row-major, `n × n`).
///
/// Tries Cholesky first and falls back to LU with partial pivoting when the
/// matrix is not numerically positive definite.
fn solve_symmetric(matrix: Vec<f64>, rhs: Vec<f64>, n: usize) -> Result<Vec<f64>> {
    match cholesky_solve(&matrix, &rhs, n) {
        Some(x) => Ok(x),
        None => {
            tracing::debug!(n, "normal equations not positive definite, using LU");
            lu_solve(matrix, rhs, n)
        }
    }
}

fn cholesky_solve(a: &[f64], b: &[f64], n: usize) -> Option<Vec<f64>> {
    let mut l = vec![0.0; n * n];
    for j in 0..n {
        let row_j = &l[j * n..j * n + j];
        let d = a[j * n + j] - row_j.iter().map(|v| v * v).sum::<f64>();
        if d <= 0.0 || !d.is_finite() {
            return None;
        }
        let d = d.sqrt();
        l[j * n + j] = d;
        for i in j + 1..n {
            let dot: f64 = l[i * n..i * n + j]
                .iter()
                .zip(&l[j * n..j * n + j])
                .map(|(x, y)| x * y)
                .sum();
            l[i * n + j] = (a[i * n + j] - dot) / d;
        }
    }

    // L y = b
    let mut y = vec![0.0; n];
    for i in 0..n {
        let dot: f64 = (0..i).map(|k| l[i * n + k] * y[k]).sum();
        y[i] = (b[i] - dot) / l[i * n + i];
    }
    // Lᵀ x = y
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let dot: f64 = (i + 1..n).map(|k| l[k * n + i] * x[k]).sum();
        x[i] = (y[i] - dot) / l[i * n + i];
    }
    x.iter().all(|v| v.is_finite()).then_some(x)
}

fn lu_solve(mut a: Vec<f64>, mut b: Vec<f64>, n: usize) -> Result<Vec<f64>> {
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| a[i * n + col].abs().total_cmp(&a[j * n + col].abs()))
            .unwrap_or(col);
        if a[pivot * n + col].abs() < 1e-300 {
            return Err(AnalysisError::SingularSystem);
        }
        if pivot != col {
            for k in 0..n {
                a.swap(col * n + k, pivot * n + k);
            }
            b.swap(col, pivot);
        }
        let diag = a[col * n + col];
        for row in col + 1..n {
            let factor = a[row * n + col] / diag;
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row * n + k] -= factor * a[col * n + k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let dot: f64 = (i + 1..n).map(|k| a[i * n + k] * x[k]).sum();
        x[i] = (b[i] - dot) / a[i * n + i];
    }
    if x.iter().all(|v| v.is_finite()) {
        Ok(x)
    } else {
        Err(AnalysisError::SingularSystem)
    }
}
