//! matcheq CLI - estimate, design and apply spectrum-matching correction filters.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "matcheq")]
#[command(author, version, about = "Match the spectrum of one playback path to another", long_about = None)]
struct Cli {
    /// Log debug output (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate the deviation of probe recordings and write inverse filters
    Estimate(commands::estimate::EstimateArgs),

    /// Convolve files with an inverse filter
    Apply(commands::apply::ApplyArgs),

    /// Run a batch job file
    Run(commands::run::RunArgs),

    /// Match the loudness of a group of files to the first one (in place)
    Equalize(commands::equalize::EqualizeArgs),

    /// Display WAV file information
    Info(commands::info::InfoArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Estimate(args) => commands::estimate::run(args),
        Commands::Apply(args) => commands::apply::run(args),
        Commands::Run(args) => commands::run::run(args),
        Commands::Equalize(args) => commands::equalize::run(args),
        Commands::Info(args) => commands::info::run(args),
    }
}
