use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, FromArgMatches, Parser};
use tracing::{error, info};
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*};

use zentga::TargetMode;
use zentga::batch::{self, BatchConfig};

/// Convert TGA images in place between color-mapped, true-color and
/// black-and-white variants.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TGA file, or folder searched recursively for `*.tga*` files.
    path: PathBuf,

    /// Target format, 0-9 (listed below).
    #[arg(value_parser = parse_mode)]
    mode: TargetMode,

    /// Worker threads (defaults to one per core).
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Log every file as it starts.
    #[arg(short, long)]
    verbose: bool,
}

fn parse_mode(s: &str) -> Result<TargetMode, String> {
    let code: u8 = s
        .parse()
        .map_err(|_| format!("`{s}` is not a format number"))?;
    TargetMode::from_code(code).map_err(|e| e.to_string())
}

fn formats_help() -> String {
    let mut help = String::from("Formats:\n");
    for mode in TargetMode::ALL {
        help.push_str(&format!("  {mode}\n"));
    }
    help
}

fn main() -> ExitCode {
    let command = Cli::command().after_help(formats_help());
    let cli = match Cli::from_arg_matches(&command.get_matches()) {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };

    let level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(level)
        .init();

    let files = match batch::collect_files(&cli.path) {
        Ok(files) => files,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    if files.is_empty() {
        info!(path = %cli.path.display(), "no TGA files found");
        return ExitCode::SUCCESS;
    }

    let config = BatchConfig {
        jobs: cli.jobs,
        ..BatchConfig::new(cli.mode)
    };
    match batch::run(&files, &config) {
        Ok(report) if report.all_succeeded() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
