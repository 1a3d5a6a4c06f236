//! WAV metadata and levels.

use clap::Args;
use matcheq_analysis::integrated_loudness;
use matcheq_core::linear_to_db;
use matcheq_io::{read_wav, read_wav_info};
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct InfoArgs {
    /// WAV files to describe
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,

    /// Header only; skip peak and loudness measurement
    #[arg(long)]
    header_only: bool,
}

pub fn run(args: InfoArgs) -> anyhow::Result<()> {
    for (i, file) in args.files.iter().enumerate() {
        if i > 0 {
            println!();
        }
        describe(file, args.header_only)?;
    }
    Ok(())
}

fn describe(file: &Path, header_only: bool) -> anyhow::Result<()> {
    let info = read_wav_info(file)?;

    println!("File:        {}", file.display());
    println!("Format:      {} {}-bit", info.format, info.bits_per_sample);
    println!("Channels:    {}", info.channels);
    println!("Sample Rate: {} Hz", info.sample_rate);
    println!("Duration:    {:.3}s ({} frames)", info.duration_secs, info.num_frames);

    if header_only {
        return Ok(());
    }

    let (buffer, _) = read_wav(file)?;
    println!("Peak:        {:.2} dBFS", linear_to_db(buffer.peak()));
    match integrated_loudness(&buffer) {
        Ok(lufs) => println!("Loudness:    {lufs:.2} LUFS"),
        Err(err) => {
            tracing::debug!(%err, "loudness unavailable");
            println!("Loudness:    n/a");
        }
    }
    Ok(())
}
