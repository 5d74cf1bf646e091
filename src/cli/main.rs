use anyhow::{Context, Result};
use clap::Parser;
use clap::error::ErrorKind;
use std::path::PathBuf;
use std::process::ExitCode;

use tzfix::config::Config;
use tzfix::offset::OffsetString;
use tzfix::pipeline;

#[derive(Parser, Debug)]
#[command(
    name = "tzfix",
    version,
    about = "Change the EXIF timezone offset of JPEG photos without shifting their local date/time",
    after_help = "Example: tzfix /path/to/photo/dir '+08:00' '+09:00'"
)]
struct Cli {
    /// Directory of photos, searched recursively for .jpg/.jpeg files
    #[arg(value_name = "PHOTO_DIR", required_unless_present = "init")]
    photo_dir: Option<PathBuf>,

    /// Offset currently recorded in the photos, e.g. +08:00
    #[arg(value_name = "EXPECTED", allow_hyphen_values = true, required_unless_present = "init")]
    expected: Option<String>,

    /// Offset to write instead, e.g. +09:00
    #[arg(value_name = "TARGET", allow_hyphen_values = true, required_unless_present = "init")]
    target: Option<String>,

    /// Path to config file (default: tzfix.json next to binary)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Initialize a default config file and exit
    #[arg(long)]
    init: bool,

    /// Verify and report without writing to files
    #[arg(long)]
    dry_run: bool,

    /// Output per-file results as JSON
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                e.exit();
            }
            let _ = e.print();
            return ExitCode::from(1);
        }
    };

    // Set up logging; stdout is reserved for the report under --json
    let log_level = if cli.verbose { "debug" } else { "info" };
    let log_target = if cli.json {
        env_logger::Target::Stderr
    } else {
        env_logger::Target::Stdout
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .format_target(false)
        .target(log_target)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    // Handle --init
    if cli.init {
        let path = Config::default().save(cli.config.as_deref())?;
        println!("Default config written to {}", path.display());
        return Ok(());
    }

    let mut config = Config::load(cli.config.as_deref())?;

    // Override dry_run from CLI flag
    if cli.dry_run {
        config.dry_run = true;
    }

    let photo_dir = cli.photo_dir.context("Missing photo directory")?;
    let expected = OffsetString::new(cli.expected.context("Missing expected offset")?)?;
    let target = OffsetString::new(cli.target.context("Missing target offset")?)?;

    let summary = pipeline::run(&photo_dir, expected, target, &config)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary.reports)?);
    }

    Ok(())
}
