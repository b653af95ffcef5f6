// src/main.rs
//! GPS Merge - merge raw GPS receiver logs into one data file per acquisition

use anyhow::Context;
use clap::{ArgAction, Parser};
use gps_merge::{
    display::{terminal::TerminalProgress, ProgressSink, SilentProgress},
    merger::{discover_batches, run_batch},
    BatchSummary, MergeConfig, MergeError, MergeMode,
};
use std::path::{Path, PathBuf};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gps-merge", version, about)]
struct Cli {
    /// Either nothing (scan the configured input directory) or INPUT OUTPUT
    #[arg(value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// Output flavour: augment data lines with date/time/position, or copy them
    #[arg(short, long, value_enum)]
    mode: Option<MergeMode>,

    /// Metadata file to leave out of the merge
    #[arg(long, value_name = "NAME")]
    exclude: Option<String>,

    /// Batch name prefix used when scanning the input directory
    #[arg(long)]
    prefix: Option<String>,

    /// Config file (defaults to ~/.config/gps-merge/config.json)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Suppress progress output
    #[arg(short, long)]
    quiet: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Print batch summaries as JSON when done
    #[arg(long)]
    json: bool,

    /// Store the effective settings in the config file before merging
    #[arg(long)]
    save_config: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => MergeConfig::load_from(path)?,
        None => MergeConfig::load().unwrap_or_default(),
    };
    if let Some(mode) = cli.mode {
        config.update_mode(mode);
    }
    if let Some(exclude) = &cli.exclude {
        config.exclude_name = Some(exclude.clone());
    }
    if let Some(prefix) = &cli.prefix {
        config.batch_prefix = prefix.clone();
    }
    if cli.save_config {
        match &cli.config {
            Some(path) => config.save_to(path)?,
            None => config.save()?,
        }
    }

    let mut progress: Box<dyn ProgressSink> = if cli.quiet {
        Box::new(SilentProgress)
    } else {
        Box::new(TerminalProgress::new())
    };

    let summaries = match cli.paths.as_slice() {
        [] => {
            let batches = discover_batches(&config.input_dir, &config.batch_prefix)?;
            if batches.is_empty() {
                warn!(
                    input_dir = %config.input_dir.display(),
                    prefix = %config.batch_prefix,
                    "no batches found"
                );
            }
            ensure_dir(&config.output_dir)?;
            batches
                .iter()
                .map(|batch| merge_one(batch, &config.output_dir, &config, progress.as_mut()))
                .collect::<anyhow::Result<Vec<_>>>()?
        }
        [input, output] => {
            if !input.exists() {
                eprintln!("{}", MergeError::InputNotFound(input.clone()));
                std::process::exit(1);
            }
            ensure_dir(output)?;
            vec![merge_one(input, output, &config, progress.as_mut())?]
        }
        _ => {
            let usage = MergeError::Usage(
                "Invalid number of arguments. Please provide either no arguments or two arguments (input and output paths)."
                    .to_string(),
            );
            eprintln!("{}", usage);
            std::process::exit(1);
        }
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    }

    Ok(())
}

fn merge_one(
    input: &Path,
    output_dir: &Path,
    config: &MergeConfig,
    progress: &mut dyn ProgressSink,
) -> anyhow::Result<BatchSummary> {
    run_batch(input, output_dir, config.mode, config.exclude_name(), progress)
        .with_context(|| format!("failed to merge {}", input.display()))
}

fn ensure_dir(path: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(path)
        .with_context(|| format!("failed to create output directory {}", path.display()))
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
