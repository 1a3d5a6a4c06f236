//! Run a batch job file.

use super::common::{BatchOutcome, SettingsArgs, batch_progress, build_engine};
use clap::Args;
use matcheq_config::{Job, Method};
use matcheq_io::{FilePair, GainMode, MatchEngine};
use std::path::PathBuf;

#[derive(Args)]
pub struct RunArgs {
    /// Job file (TOML)
    #[arg(value_name = "JOB")]
    job: PathBuf,

    #[command(flatten)]
    settings: SettingsArgs,
}

pub fn run(args: RunArgs) -> anyhow::Result<()> {
    let job = Job::load(&args.job)?;
    job.validate()?;
    let (engine, _) = build_engine(&[&job.settings, &args.settings.overrides()])?;

    let pairs: Vec<FilePair> = job
        .pairs
        .iter()
        .map(|p| FilePair::new(&p.reference, &p.probe))
        .collect();

    println!("Job:      {} ({})", args.job.display(), job.method);
    println!("  {} pair(s), {} target(s)", pairs.len(), job.targets.len());

    match job.method {
        Method::Calibrate => calibrate(&engine, &pairs, &job.targets, &job.suffix),
        Method::PerPair => {
            if !job.targets.is_empty() {
                tracing::warn!(count = job.targets.len(), "targets are ignored by per-pair jobs");
            }
            per_pair(&engine, &pairs, &job.suffix)
        }
    }
}

fn calibrate(engine: &MatchEngine, pairs: &[FilePair], targets: &[PathBuf], suffix: &str) -> anyhow::Result<()> {
    let artifact = if pairs.len() == 1 {
        engine.write_inverse_filter(&pairs[0])?
    } else {
        engine.write_mean_inverse_filter(pairs)?
    };
    let gain = engine.calibration_gain(pairs, &artifact.path)?;
    println!("Filter:   {}", artifact.path.display());
    println!("  gain {:.6} ({:+.2} dB)", gain, matcheq_core::linear_to_db(gain));

    let pb = batch_progress(targets.len())?;
    let mut outcome = BatchOutcome::default();
    let gain = GainMode::Fixed(gain);

    for target in targets {
        pb.set_message(target.display().to_string());
        let result = engine
            .apply_correction(target, &artifact.path, &gain, suffix)
            .map_err(anyhow::Error::from);
        outcome.record(target, result);
        pb.inc(1);
    }
    pb.finish_with_message("done");

    outcome.finish()
}

fn per_pair(engine: &MatchEngine, pairs: &[FilePair], suffix: &str) -> anyhow::Result<()> {
    let pb = batch_progress(pairs.len())?;
    let mut outcome = BatchOutcome::default();

    for pair in pairs {
        pb.set_message(pair.probe.display().to_string());
        let result = engine.write_inverse_filter(pair).and_then(|artifact| {
            engine.apply_correction(
                &pair.probe,
                &artifact.path,
                &GainMode::MatchReference(pair.reference.clone()),
                suffix,
            )
        });
        outcome.record(&pair.probe, result.map_err(anyhow::Error::from));
        pb.inc(1);
    }
    pb.finish_with_message("done");

    outcome.finish()
}
