//! File-level matching engine.
//!
//! Wraps the estimator, designer and applicator from `matcheq-analysis`
//! with WAV reading, output naming and artifact writing.

use crate::naming::{corrected_path, inverse_filter_path, mean_inverse_filter_path};
use crate::wav::{WavSpec, read_wav, write_wav};
use crate::{Error, Result};
use matcheq_analysis::{
    AnalysisError, CorrectionFilter, CorrectionGain, DesignConfig, EstimatorConfig,
    InverseFilterDesigner, MagnitudeDifference, ResponseEstimator, apply_correction,
    calibration_gain, integrated_loudness, loudness_gain,
};
use matcheq_analysis::export::import_frd;
use matcheq_core::AudioBuffer;
use std::path::{Path, PathBuf};

/// A reference recording and the same material through the path to correct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePair {
    /// Recording through the reference path.
    pub reference: PathBuf,
    /// Recording through the path being corrected.
    pub probe: PathBuf,
}

impl FilePair {
    /// Create a pair.
    pub fn new(reference: impl Into<PathBuf>, probe: impl Into<PathBuf>) -> Self {
        Self {
            reference: reference.into(),
            probe: probe.into(),
        }
    }
}

/// Gain applied when correcting a file.
#[derive(Debug, Clone, PartialEq)]
pub enum GainMode {
    /// No gain.
    Unity,
    /// A gain computed once (e.g. by [`MatchEngine::calibration_gain`]).
    Fixed(f64),
    /// Match the integrated loudness of this file.
    MatchReference(PathBuf),
}

/// A written inverse filter.
#[derive(Debug, Clone)]
pub struct FilterArtifact {
    /// Where the filter was written.
    pub path: PathBuf,
    /// The designed filter.
    pub filter: CorrectionFilter,
    /// The deviation it inverts.
    pub curve: MagnitudeDifference,
}

/// A written corrected file.
#[derive(Debug, Clone)]
pub struct CorrectionArtifact {
    /// Where the corrected audio was written.
    pub path: PathBuf,
    /// Linear gain applied after convolution.
    pub gain: f64,
    /// Samples per channel written.
    pub num_frames: usize,
}

/// Estimates, designs and applies correction filters on WAV files.
#[derive(Debug, Clone)]
pub struct MatchEngine {
    estimator: ResponseEstimator,
    designer: InverseFilterDesigner,
}

impl MatchEngine {
    /// Create an engine, validating both configurations.
    pub fn new(estimator: EstimatorConfig, design: DesignConfig) -> Result<Self> {
        Ok(Self {
            estimator: ResponseEstimator::new(estimator)?,
            designer: InverseFilterDesigner::new(design)?,
        })
    }

    /// The response estimator.
    pub fn estimator(&self) -> &ResponseEstimator {
        &self.estimator
    }

    /// The filter designer.
    pub fn designer(&self) -> &InverseFilterDesigner {
        &self.designer
    }

    /// Estimate the deviation of one pair of files.
    pub fn estimate_pair(&self, pair: &FilePair) -> Result<MagnitudeDifference> {
        let (reference, _) = read_wav(&pair.reference)?;
        let (probe, _) = read_wav(&pair.probe)?;
        let curve = self.estimator.estimate(&reference, &probe)?;
        tracing::debug!(
            probe = %pair.probe.display(),
            frames = curve.frames,
            retained = curve.retained_frames,
            "estimated deviation"
        );
        Ok(curve)
    }

    /// Design an inverse filter from one pair and write it as
    /// `<probe stem>_inv_filter.wav`.
    pub fn write_inverse_filter(&self, pair: &FilePair) -> Result<FilterArtifact> {
        let curve = self.estimate_pair(pair)?;
        self.write_filter(curve, inverse_filter_path(&pair.probe))
    }

    /// Design one inverse filter from the unweighted mean deviation of all
    /// pairs and write it as `<first probe stem>_mean_inv_filter.wav`.
    pub fn write_mean_inverse_filter(&self, pairs: &[FilePair]) -> Result<FilterArtifact> {
        let first = pairs.first().ok_or(Error::EmptyBatch("calibration pairs"))?;
        let curves = pairs
            .iter()
            .map(|pair| self.estimate_pair(pair))
            .collect::<Result<Vec<_>>>()?;
        let curve = MagnitudeDifference::mean(&curves)?;
        self.write_filter(curve, mean_inverse_filter_path(&first.probe))
    }

    /// Design an inverse filter from a deviation curve saved as FRD and
    /// write it as `<frd stem>_inv_filter.wav`.
    pub fn write_filter_from_frd(&self, frd: &Path) -> Result<FilterArtifact> {
        let curve = import_frd(frd)?;
        tracing::debug!(path = %frd.display(), bins = curve.len(), "loaded deviation curve");
        self.write_filter(curve, inverse_filter_path(frd))
    }

    fn write_filter(&self, curve: MagnitudeDifference, path: PathBuf) -> Result<FilterArtifact> {
        let filter = self.designer.design(&curve)?;
        let buffer = AudioBuffer::from_mono(filter.taps.clone(), curve.sample_rate as u32);
        write_wav(&path, &buffer, WavSpec::float32(1, buffer.sample_rate))?;
        tracing::info!(path = %path.display(), ntaps = filter.len(), "wrote inverse filter");
        Ok(FilterArtifact {
            path,
            filter,
            curve,
        })
    }

    /// Loudness gain that brings each filtered probe to its reference,
    /// averaged (linearly) over all pairs. Nothing is written.
    pub fn calibration_gain(&self, pairs: &[FilePair], filter: &Path) -> Result<f64> {
        if pairs.is_empty() {
            return Err(Error::EmptyBatch("calibration pairs"));
        }
        let (taps, filter_rate) = read_filter(filter)?;

        let mut sum = 0.0;
        for pair in pairs {
            let (reference, _) = read_wav(&pair.reference)?;
            let (probe, _) = read_wav(&pair.probe)?;
            check_rate(filter_rate, probe.sample_rate, &pair.probe)?;
            sum += calibration_gain(&probe, &taps, &reference)?;
        }
        let gain = sum / pairs.len() as f64;
        tracing::info!(gain, pairs = pairs.len(), "calibration gain");
        Ok(gain)
    }

    /// Convolve `target` with the filter stored at `filter`, apply `gain`,
    /// and write `<target stem>_corr<suffix>.wav` as 24-bit PCM.
    pub fn apply_correction(
        &self,
        target: &Path,
        filter: &Path,
        gain: &GainMode,
        suffix: &str,
    ) -> Result<CorrectionArtifact> {
        let (taps, filter_rate) = read_filter(filter)?;
        let (signal, _) = read_wav(target)?;
        check_rate(filter_rate, signal.sample_rate, target)?;

        let gain = match gain {
            GainMode::Unity => CorrectionGain::Unity,
            GainMode::Fixed(g) => CorrectionGain::Fixed(*g),
            GainMode::MatchReference(reference) => {
                let (reference, _) = read_wav(reference)?;
                CorrectionGain::MatchLoudness {
                    target_lufs: integrated_loudness(&reference)?,
                }
            }
        };
        let corrected = apply_correction(&signal, &taps, gain)?;

        let path = corrected_path(target, suffix);
        let spec = WavSpec::pcm24(corrected.buffer.num_channels() as u16, signal.sample_rate);
        write_wav(&path, &corrected.buffer, spec)?;
        tracing::info!(path = %path.display(), gain = corrected.gain, "wrote corrected file");

        Ok(CorrectionArtifact {
            path,
            gain: corrected.gain,
            num_frames: corrected.buffer.len(),
        })
    }

    /// Scale every file after the first to the integrated loudness of the
    /// first, rewriting each in place in its own sample format.
    ///
    /// Only a failure on the first file aborts the group. Every other file
    /// gets its own result: the gain applied (1.0 for the first) or the
    /// error that left it untouched.
    pub fn equalize_loudness(&self, files: &[PathBuf]) -> Result<Vec<Result<f64>>> {
        let first = files.first().ok_or(Error::EmptyBatch("loudness group"))?;
        let (reference, _) = read_wav(first)?;
        let target_lufs = integrated_loudness(&reference)?;
        tracing::debug!(path = %first.display(), target_lufs, "loudness target");

        let mut gains = vec![Ok(1.0)];
        gains.extend(files[1..].iter().map(|file| rescale_to_loudness(file, target_lufs)));
        Ok(gains)
    }
}

fn rescale_to_loudness(file: &Path, target_lufs: f64) -> Result<f64> {
    let (mut audio, spec) = read_wav(file)?;
    let gain = loudness_gain(target_lufs, integrated_loudness(&audio)?);
    audio.scale(gain);
    write_wav(file, &audio, spec)?;
    tracing::info!(path = %file.display(), gain, "equalized loudness");
    Ok(gain)
}

/// Read filter taps (first channel) and their sample rate.
fn read_filter(path: &Path) -> Result<(Vec<f64>, u32)> {
    let (buffer, _) = read_wav(path)?;
    if buffer.num_channels() > 1 {
        tracing::warn!(path = %path.display(), channels = buffer.num_channels(), "using first channel of filter");
    }
    let sample_rate = buffer.sample_rate;
    let taps = buffer.channels.into_iter().next().unwrap_or_default();
    if taps.is_empty() {
        return Err(AnalysisError::InvalidFilterLength(0).into());
    }
    Ok((taps, sample_rate))
}

fn check_rate(filter_rate: u32, signal_rate: u32, path: &Path) -> Result<()> {
    if filter_rate != signal_rate {
        return Err(AnalysisError::IncompatibleSignals {
            reason: format!(
                "filter designed at {filter_rate} Hz, {} is {signal_rate} Hz",
                path.display()
            ),
        }
        .into());
    }
    Ok(())
}
