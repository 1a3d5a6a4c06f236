//! Loudness equalization of a group of files.

use super::common::BatchOutcome;
use clap::Args;
use matcheq_io::MatchEngine;
use std::path::PathBuf;

#[derive(Args)]
pub struct EqualizeArgs {
    /// Files to equalize; the first sets the target loudness
    #[arg(value_name = "FILE", num_args = 2.., required = true)]
    files: Vec<PathBuf>,
}

pub fn run(args: EqualizeArgs) -> anyhow::Result<()> {
    let engine = MatchEngine::new(Default::default(), Default::default())?;
    let gains = engine.equalize_loudness(&args.files)?;

    println!("Loudness reference: {}", args.files[0].display());
    let mut outcome = BatchOutcome::default();
    for (file, gain) in args.files.iter().zip(gains).skip(1) {
        if let Some(gain) = outcome.record(file, gain.map_err(anyhow::Error::from)) {
            println!("  {:+7.2} dB  {}", matcheq_core::linear_to_db(gain), file.display());
        }
    }
    outcome.finish()
}
