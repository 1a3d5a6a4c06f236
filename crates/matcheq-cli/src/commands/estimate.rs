//! Estimate deviations and write inverse filters.

use super::common::{BatchOutcome, SettingsArgs, build_engine, zip_pairs};
use clap::Args;
use matcheq_analysis::export::{export_frd, export_response_csv};
use matcheq_config::AnalysisSettings;
use matcheq_io::{FilePair, FilterArtifact, MatchEngine};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args)]
pub struct EstimateArgs {
    /// Reference recording (repeat for several pairs)
    #[arg(short, long, required_unless_present = "from_frd")]
    reference: Vec<PathBuf>,

    /// Probe recording, paired in order with --reference
    #[arg(short, long, required_unless_present = "from_frd")]
    probe: Vec<PathBuf>,

    /// Design from a deviation curve saved with --frd instead of recordings
    #[arg(long, value_name = "FRD", conflicts_with_all = ["reference", "probe", "mean", "gain"])]
    from_frd: Option<PathBuf>,

    /// Design one filter from the mean deviation of all pairs
    #[arg(long)]
    mean: bool,

    /// Also compute the loudness calibration gain
    #[arg(long)]
    gain: bool,

    /// Write a target vs. achieved response CSV (single filter only)
    #[arg(long, value_name = "CSV")]
    report: Option<PathBuf>,

    /// Write the deviation curve as FRD (single filter only)
    #[arg(long, value_name = "FRD")]
    frd: Option<PathBuf>,

    /// Write a JSON summary of the written filters
    #[arg(long, value_name = "JSON")]
    json: Option<PathBuf>,

    #[command(flatten)]
    settings: SettingsArgs,
}

#[derive(Serialize)]
struct Summary {
    settings: AnalysisSettings,
    filters: Vec<FilterSummary>,
}

#[derive(Serialize)]
struct FilterSummary {
    path: PathBuf,
    pairs: usize,
    frames: usize,
    retained_frames: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    gain: Option<f64>,
}

pub fn run(args: EstimateArgs) -> anyhow::Result<()> {
    let (engine, settings) = build_engine(&[&args.settings.overrides()])?;

    if let Some(frd) = &args.from_frd {
        let artifact = engine.write_filter_from_frd(frd)?;
        let summary = summarize(&engine, &artifact, &[], false)?;
        write_extras(&engine, &artifact, args.report.as_ref(), args.frd.as_ref())?;
        return write_summary(args.json.as_ref(), settings, vec![summary]);
    }

    let pairs = zip_pairs(args.reference, args.probe)?;

    let single_output = args.mean || pairs.len() == 1;
    if !single_output && (args.report.is_some() || args.frd.is_some()) {
        anyhow::bail!("--report and --frd need a single filter: pass one pair or --mean");
    }

    let mut filters = Vec::new();
    let mut outcome = BatchOutcome::default();

    if args.mean {
        let artifact = engine.write_mean_inverse_filter(&pairs)?;
        let summary = summarize(&engine, &artifact, &pairs, args.gain)?;
        write_extras(&engine, &artifact, args.report.as_ref(), args.frd.as_ref())?;
        filters.push(summary);
    } else {
        for pair in &pairs {
            let result = engine.write_inverse_filter(pair).map_err(anyhow::Error::from).and_then(|artifact| {
                let summary = summarize(&engine, &artifact, std::slice::from_ref(pair), args.gain)?;
                write_extras(&engine, &artifact, args.report.as_ref(), args.frd.as_ref())?;
                Ok(summary)
            });
            if let Some(summary) = outcome.record(&pair.probe, result) {
                filters.push(summary);
            }
        }
    }

    write_summary(args.json.as_ref(), settings, filters)?;
    outcome.finish()
}

fn write_summary(path: Option<&PathBuf>, settings: AnalysisSettings, filters: Vec<FilterSummary>) -> anyhow::Result<()> {
    if let Some(path) = path {
        let json = serde_json::to_string_pretty(&Summary { settings, filters })?;
        std::fs::write(path, json)?;
        println!("Summary:  {}", path.display());
    }
    Ok(())
}

fn summarize(
    engine: &MatchEngine,
    artifact: &FilterArtifact,
    pairs: &[FilePair],
    with_gain: bool,
) -> anyhow::Result<FilterSummary> {
    println!("Filter:   {}", artifact.path.display());
    if pairs.is_empty() {
        println!("  {} taps", artifact.filter.len());
    } else {
        println!(
            "  {} taps, {} of {} frames used",
            artifact.filter.len(),
            artifact.curve.retained_frames,
            artifact.curve.frames
        );
    }

    let gain = if with_gain {
        let gain = engine.calibration_gain(pairs, &artifact.path)?;
        println!("  gain {:.6} ({:+.2} dB)", gain, matcheq_core::linear_to_db(gain));
        Some(gain)
    } else {
        None
    };

    Ok(FilterSummary {
        path: artifact.path.clone(),
        pairs: pairs.len(),
        frames: artifact.curve.frames,
        retained_frames: artifact.curve.retained_frames,
        gain,
    })
}

fn write_extras(
    engine: &MatchEngine,
    artifact: &FilterArtifact,
    report: Option<&PathBuf>,
    frd: Option<&PathBuf>,
) -> anyhow::Result<()> {
    if let Some(path) = report {
        export_response_csv(&artifact.curve, engine.designer(), &artifact.filter, path)?;
        println!("Report:   {}", path.display());
    }
    if let Some(path) = frd {
        export_frd(&artifact.curve, path)?;
        println!("FRD:      {}", path.display());
    }
    Ok(())
}
