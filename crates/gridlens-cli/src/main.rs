// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// gridlens: read a 9x9 number puzzle from a photo.
//
// Entry point. Initialises logging, loads the configuration and the digit
// model, runs one recognition pipeline and prints the grid.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use gridlens_core::human_errors::{Severity, humanize_error};
use gridlens_core::{ReaderConfig, Result};
use gridlens_vision::{CellReading, ClassifierModel, PixelBuffer, RecognitionPipeline};

#[derive(Parser)]
#[command(name = "gridlens")]
#[command(about = "Read a 9x9 number puzzle from a photo")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recognise the grid in a photo.
    Read(ReadArgs),

    /// Print the effective configuration as JSON.
    Config {
        /// JSON configuration file to merge over the defaults.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Args)]
struct ReadArgs {
    /// Photo of the puzzle (PNG, JPEG, ...).
    image: PathBuf,

    /// Classifier samples file (one row of thumbnail intensities per sample).
    #[arg(long)]
    samples: PathBuf,

    /// Classifier responses file (one label per sample).
    #[arg(long)]
    responses: PathBuf,

    /// JSON configuration file; missing fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the intermediate height the photo is scaled to.
    #[arg(long)]
    height: Option<u32>,

    /// Write intermediate images and a summary into this (empty) directory.
    #[arg(long)]
    debug_out: Option<PathBuf>,

    /// Print the boxed grid instead of the 81-digit string.
    #[arg(long, conflicts_with = "json")]
    pretty: bool,

    /// Print a JSON report.
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    grid: String,
    digits: usize,
    cells: &'a [CellReading],
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Commands::Read(args) => run_read(&args),
        Commands::Config { config } => run_config(config),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let human = humanize_error(&err);
            eprintln!("error: {}", human.message);
            eprintln!("  {}", human.suggestion);
            tracing::debug!(error = %err, "Command failed");
            match human.severity {
                Severity::Retake => ExitCode::from(2),
                Severity::ActionRequired | Severity::Permanent => ExitCode::FAILURE,
            }
        }
    }
}

fn load_config(path: Option<PathBuf>) -> Result<ReaderConfig> {
    match path {
        Some(path) => ReaderConfig::load(path),
        None => Ok(ReaderConfig::default()),
    }
}

fn run_config(path: Option<PathBuf>) -> Result<()> {
    let config = load_config(path)?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn run_read(args: &ReadArgs) -> Result<()> {
    let mut config = load_config(args.config.clone())?;
    if let Some(height) = args.height {
        config = config.with_intermediate_height(height);
    }
    config.validate()?;

    let model = Arc::new(ClassifierModel::load(
        &args.samples,
        &args.responses,
        config.feature_len(),
    )?);
    let image = PixelBuffer::open(&args.image)?;
    let mut pipeline = RecognitionPipeline::new(image, model, config)?;

    let result = pipeline.read();

    if let Some(dir) = &args.debug_out {
        match pipeline.state().save_artifacts(dir) {
            Ok(files) => tracing::info!(count = files.len(), dir = %dir.display(), "Debug artifacts written"),
            Err(err) => tracing::warn!(error = %err, "Could not write debug artifacts"),
        }
    }

    let grid = result?;
    if args.json {
        let report = Report {
            grid: grid.serialize(),
            digits: gridlens_core::GRID_CELLS - grid.blank_count(),
            cells: &pipeline.state().readings,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if args.pretty {
        print!("{}", grid.pretty());
    } else {
        println!("{grid}");
    }
    Ok(())
}
