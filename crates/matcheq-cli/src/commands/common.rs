//! Shared CLI helpers used across multiple commands.

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use matcheq_config::{AnalysisSettings, SettingsOverrides, resolve};
use matcheq_io::{FilePair, MatchEngine};
use std::path::PathBuf;

/// Analysis settings that can be given on the command line.
#[derive(Args, Debug, Default)]
pub struct SettingsArgs {
    /// STFT window length in samples
    #[arg(long)]
    pub window_size: Option<usize>,

    /// Smoothing bands per octave (3 = third-octave)
    #[arg(long)]
    pub bands_per_octave: Option<f64>,

    /// Inverse filter length (odd)
    #[arg(long)]
    pub ntaps: Option<usize>,

    /// Lowest corrected frequency in Hz
    #[arg(long)]
    pub f_min: Option<f64>,

    /// Highest corrected frequency in Hz
    #[arg(long)]
    pub f_max: Option<f64>,
}

impl SettingsArgs {
    /// The flags that were given, as an override layer.
    pub fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            window_size: self.window_size,
            bands_per_octave: self.bands_per_octave,
            ntaps: self.ntaps,
            f_min: self.f_min,
            f_max: self.f_max,
        }
    }
}

/// Resolve settings from `layers` (lowest priority first) and build an engine.
pub fn build_engine(layers: &[&SettingsOverrides]) -> anyhow::Result<(MatchEngine, AnalysisSettings)> {
    let settings = resolve(layers)?;
    tracing::debug!(?settings, "analysis settings");
    let engine = MatchEngine::new(settings.estimator_config(), settings.design_config())?;
    Ok((engine, settings))
}

/// Zip `--reference` and `--probe` lists into pairs.
pub fn zip_pairs(references: Vec<PathBuf>, probes: Vec<PathBuf>) -> anyhow::Result<Vec<FilePair>> {
    if references.len() != probes.len() {
        anyhow::bail!(
            "{} reference file(s) but {} probe file(s); they are paired in order",
            references.len(),
            probes.len()
        );
    }
    Ok(references
        .into_iter()
        .zip(probes)
        .map(|(reference, probe)| FilePair { reference, probe })
        .collect())
}

/// Progress bar for a batch of `len` items.
pub fn batch_progress(len: usize) -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("##-"),
    );
    Ok(pb)
}

/// Counts failures in a batch that keeps going after errors.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    total: usize,
    failed: usize,
}

impl BatchOutcome {
    /// Record one item's result, logging failures.
    pub fn record<T>(&mut self, item: &std::path::Path, result: anyhow::Result<T>) -> Option<T> {
        self.total += 1;
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.failed += 1;
                tracing::error!(path = %item.display(), "{err:#}");
                None
            }
        }
    }

    /// Error if anything failed.
    pub fn finish(self) -> anyhow::Result<()> {
        if self.failed > 0 {
            anyhow::bail!("{} of {} item(s) failed", self.failed, self.total);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn zip_pairs_requires_equal_lengths() {
        let pairs = zip_pairs(vec!["r1.wav".into(), "r2.wav".into()], vec!["p1.wav".into(), "p2.wav".into()]).unwrap();
        assert_eq!(pairs[1], FilePair::new("r2.wav", "p2.wav"));
        assert!(zip_pairs(vec!["r.wav".into()], vec![]).is_err());
    }

    #[test]
    fn batch_outcome_fails_after_any_error() {
        let mut outcome = BatchOutcome::default();
        assert_eq!(outcome.record(Path::new("a"), Ok(1)), Some(1));
        assert_eq!(outcome.record::<i32>(Path::new("b"), Err(anyhow::anyhow!("boom"))), None);
        let err = outcome.finish().unwrap_err();
        assert_eq!(err.to_string(), "1 of 2 item(s) failed");

        assert!(BatchOutcome::default().finish().is_ok());
    }

    #[test]
    fn overrides_carry_only_given_flags() {
        let args = SettingsArgs {
            ntaps: Some(255),
            ..Default::default()
        };
        let overrides = args.overrides();
        assert_eq!(overrides.ntaps, Some(255));
        assert_eq!(overrides.f_min, None);
    }
}
