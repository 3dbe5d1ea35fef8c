//! # Sweep Plot Entry Point
//! Averages replicate rows of a simulation sweep CSV and charts two measured
//! quantities against the swept variable.
//!
//! ## Modes
//! - **Single job:** flags describe one input → chart run.
//! - **Job file:** `--config` runs every `[[plot]]` table, one scoped thread each.
//! - **Init:** `--init-config` writes a default `sweep_plot.toml`.
//!
//! ## Outputs
//! - stdout: `<x>, <mean1>, <mean2>` per distinct x-value.
//! - chart file: `.html` (interactive), `.svg`, or `.png` with the `ttf` feature.
//!
//! Exit code 0 on success, 1 on any failure.

use std::{path::Path, process::ExitCode};

use anyhow::{Context, Result, bail};
use clap::Parser;
use env_logger::Env;
use log::{error, info};

use sweep_plot::{
    plot::{run_job, run_jobs},
    utils::{
        cli::Args,
        config::{Config, DEFAULT_CONFIG_FILE},
    },
};

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    if args.init_config {
        return match write_default_config(Path::new(DEFAULT_CONFIG_FILE)) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error: {:#}", e);
                ExitCode::FAILURE
            }
        };
    }

    init_logging(args.verbose);
    info!("=== SWEEP PLOT v{} ===", env!("CARGO_PKG_VERSION"));

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();
}

fn run(args: &Args) -> Result<()> {
    let Some(config_path) = &args.config else {
        let job = args.to_job();
        run_job(&job).with_context(|| format!("plotting {}", job.input.display()))?;
        return Ok(());
    };

    let config = Config::load(config_path)?;
    if config.plots.is_empty() {
        bail!("{} defines no [[plot]] jobs", config_path.display());
    }

    info!("running {} plot jobs from {}", config.plots.len(), config_path.display());
    let outcomes = run_jobs(&config.plots);
    let failed = outcomes.iter().filter(|o| o.is_err()).count();
    if failed > 0 {
        bail!("{} of {} plot jobs failed", failed, outcomes.len());
    }
    Ok(())
}

fn write_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        bail!("{} already exists; remove it or edit it directly", path.display());
    }
    std::fs::write(path, Config::default_toml()?)
        .with_context(|| format!("writing {}", path.display()))?;
    println!("Created {} with the reference plot job.", path.display());
    Ok(())
}
