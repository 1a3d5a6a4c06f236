//! Export formats for deviation curves and designed filters.
//!
//! - CSV report of target vs. achieved filter response
//! - FRD format (frequency response data, compatible with REW)

use crate::design::{CorrectionFilter, InverseFilterDesigner};
use crate::estimate::MagnitudeDifference;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Write a `frequency_hz,target_db,response_db` CSV.
///
/// `target_db` is the inverse of the band-limited deviation the designer
/// fitted; `response_db` is the magnitude the designed filter achieves at the
/// same frequency. The DC bin is skipped.
pub fn export_response_csv(
    curve: &MagnitudeDifference,
    designer: &InverseFilterDesigner,
    filter: &CorrectionFilter,
    path: impl AsRef<Path>,
) -> std::io::Result<()> {
    let mut file = BufWriter::new(std::fs::File::create(path)?);

    let target = designer.flatten_band_edges(curve);
    let response = filter.response_db(&curve.frequencies);

    writeln!(file, "frequency_hz,target_db,response_db")?;
    for i in 1..curve.len() {
        writeln!(
            file,
            "{:.4},{:.6},{:.6}",
            curve.frequencies[i], -target[i], response[i]
        )?;
    }
    file.flush()
}

/// Export a deviation curve to FRD format (REW compatible).
///
/// Lines are `frequency_hz magnitude_db phase_deg`; the estimate carries no
/// phase so the last column is always zero.
pub fn export_frd(curve: &MagnitudeDifference, path: impl AsRef<Path>) -> std::io::Result<()> {
    let mut file = BufWriter::new(std::fs::File::create(path)?);

    writeln!(file, "* Magnitude deviation exported by matcheq")?;
    writeln!(file, "* sample_rate {}", curve.sample_rate)?;
    for (freq, mag) in curve.frequencies.iter().zip(curve.magnitude_db.iter()) {
        writeln!(file, "{:.6} {:.6} 0.0", freq, mag)?;
    }
    file.flush()
}

/// Import a deviation curve from FRD format.
///
/// The sample rate is taken from a `* sample_rate` comment when present,
/// otherwise from twice the last frequency. Frame counts are unknown and set
/// to zero.
pub fn import_frd(path: impl AsRef<Path>) -> std::io::Result<MagnitudeDifference> {
    let reader = BufReader::new(std::fs::File::open(path)?);

    let mut frequencies = Vec::new();
    let mut magnitude_db = Vec::new();
    let mut sample_rate = None;

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();

        if let Some(comment) = line.strip_prefix('*') {
            if let Some(value) = comment.trim().strip_prefix("sample_rate") {
                sample_rate = value.trim().parse::<f64>().ok();
            }
            continue;
        }
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut parts = line.split_whitespace();
        if let (Some(Ok(freq)), Some(Ok(mag))) = (
            parts.next().map(str::parse::<f64>),
            parts.next().map(str::parse::<f64>),
        ) {
            frequencies.push(freq);
            magnitude_db.push(mag);
        }
    }

    let sample_rate =
        sample_rate.unwrap_or_else(|| frequencies.last().map_or(0.0, |&f| 2.0 * f));

    Ok(MagnitudeDifference {
        frequencies,
        magnitude_db,
        sample_rate,
        frames: 0,
        retained_frames: 0,
    })
}
