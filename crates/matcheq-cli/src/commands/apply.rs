//! Apply an inverse filter to files.

use super::common::{BatchOutcome, batch_progress};
use clap::Args;
use matcheq_io::{GainMode, MatchEngine, naming};
use std::path::PathBuf;

#[derive(Args)]
pub struct ApplyArgs {
    /// Inverse filter WAV
    #[arg(short, long)]
    filter: PathBuf,

    /// Files to correct
    #[arg(value_name = "TARGET", required = true)]
    targets: Vec<PathBuf>,

    /// Fixed linear gain (e.g. from `estimate --gain`)
    #[arg(long, conflicts_with = "match_loudness")]
    gain: Option<f64>,

    /// Match each output's loudness to this file
    #[arg(long, value_name = "REFERENCE")]
    match_loudness: Option<PathBuf>,

    /// Appended after `_corr` in output names
    #[arg(long, default_value = "")]
    suffix: String,
}

pub fn run(args: ApplyArgs) -> anyhow::Result<()> {
    let gain = match (args.gain, args.match_loudness) {
        (Some(g), _) => GainMode::Fixed(g),
        (None, Some(reference)) => GainMode::MatchReference(reference),
        (None, None) => GainMode::Unity,
    };
    // Settings only matter for design; defaults are enough to apply.
    let engine = MatchEngine::new(Default::default(), Default::default())?;

    let pb = batch_progress(args.targets.len())?;
    let mut outcome = BatchOutcome::default();

    for target in &args.targets {
        pb.set_message(target.display().to_string());
        if naming::is_derived(target, &args.suffix) {
            tracing::warn!(path = %target.display(), "skipping generated file");
            pb.inc(1);
            continue;
        }
        let result = engine
            .apply_correction(target, &args.filter, &gain, &args.suffix)
            .map_err(anyhow::Error::from);
        if let Some(artifact) = outcome.record(target, result) {
            pb.println(format!("{} (gain {:.4})", artifact.path.display(), artifact.gain));
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    outcome.finish()
}
