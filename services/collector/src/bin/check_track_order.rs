//! Checks that `Track: N` events recorded by the collector arrived in
//! ascending order.

use std::{path::PathBuf, process::ExitCode};

use anyhow::Result;
use clap::Parser;
use event_collector::check_track_file;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "check-track-order")]
#[command(about = "Verify recorded track events arrived in ascending order", long_about = None)]
#[command(version)]
struct Cli {
    /// Batch content file written by the collector
    #[arg(long, env = "BATCH_OUTPUT_FILE", default_value = "output_files/batch_content.txt")]
    file: PathBuf,

    /// Exit with a non-zero status when any inconsistency is found
    #[arg(long)]
    strict: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing();

    let report = check_track_file(&cli.file)?;
    print!("{report}");

    if cli.strict && !report.is_clean() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_target(false).init();
}
