//! convstudy - Main CLI Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use convstudy::{
    analysis::{compute_order, ConvergenceEstimator},
    cli::{Args, Commands, Config, RunArgs, Verbosity},
    display::{self, ProgressSource},
    report::{write_report_file, ReportFormat},
    source,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn init_logging(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("convstudy={}", verbosity.log_filter())));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Load config and apply command-line overrides
fn resolve_config(args: &Args, run: Option<&RunArgs>) -> Result<Config> {
    let mut config = Config::load(args.config.clone()).context("Failed to load configuration")?;

    if let Some(run) = run {
        if let Some(spacings) = &run.spacings {
            config.study.spacings = spacings.clone();
        }
        if let Some(tests) = &run.tests {
            config.study.test_cases = tests.clone();
        }
        if let Some(output) = &run.output {
            config.output.path = output.to_string_lossy().into_owned();
        }
        if let Some(format) = run.format {
            config.output.format = format;
        }
    }

    config.expand_paths();
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Run the study; returns false when an expected-order check fails
fn run_study(args: &Args, run: &RunArgs) -> Result<bool> {
    run.validate().map_err(anyhow::Error::msg)?;

    let verbosity = args.verbosity();
    let config = resolve_config(args, Some(run))?;
    let source_config = config.source()?;

    tracing::info!(source = source_config.kind(), "composing error source");
    let error_source = source::from_config(source_config).context("Failed to set up error source")?;

    let total = config.study.test_cases.len() * config.study.spacings.len();
    let tracked = ProgressSource::new(error_source.as_ref(), total, verbosity.show_progress());

    let estimator = ConvergenceEstimator::with_config(config.estimator_config());
    let result = estimator.build_report(&config.study.spacings, &config.study.test_cases, &tracked);
    tracked.finish();
    let report = result.context("Convergence study failed")?;

    let output = PathBuf::from(&config.output.path);
    write_report_file(&report, config.output.format, &output)
        .with_context(|| format!("Failed to write report to {}", output.display()))?;

    if verbosity.show_summary() {
        display::print_summary(&report);
        let kind = match config.output.format {
            ReportFormat::Jsonl => "JSONL",
            ReportFormat::Asciimath => "AsciiMath",
        };
        println!("{} {} report written to {}", "✓".green(), kind, output.display());
    }

    if let Some(expected) = run.expect_order {
        let deviations = report.check_orders(expected, run.order_tolerance);
        if verbosity.show_summary() || !deviations.is_empty() {
            display::print_check(&deviations, expected, run.order_tolerance);
        }
        return Ok(deviations.is_empty());
    }

    Ok(true)
}

fn show_config(args: &Args, write: Option<&Path>) -> Result<()> {
    let config = resolve_config(args, None)?;

    println!("{}", "convstudy Configuration".bold().cyan());
    println!("{}", "=".repeat(60).cyan());
    match &args.config {
        Some(path) => println!("Loaded from: {}", path.display()),
        None => println!("Loaded from: default lookup"),
    }
    println!();
    print!("{}", config.to_toml()?);
    if config.source.is_none() {
        println!();
        println!("{} no [source] configured; `run` will refuse to start", "Warning:".yellow().bold());
    }

    if let Some(path) = write {
        config
            .save(path)
            .with_context(|| format!("Failed to write configuration to {}", path.display()))?;
        println!("{} Configuration written to {}", "✓".green(), path.display());
    }

    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbosity());

    let outcome = match &args.command {
        Commands::Run(run) => run_study(&args, run),
        Commands::Order {
            h_fine,
            h_coarse,
            e_fine,
            e_coarse,
        } => compute_order(*h_fine, *h_coarse, *e_fine, *e_coarse)
            .map(|order| {
                println!("{:.6}", order);
                true
            })
            .map_err(anyhow::Error::from),
        Commands::Config { write } => show_config(&args, write.as_deref()).map(|_| true),
    };

    match outcome {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            display::show_error(&format!("{:#}", e));
            std::process::exit(2);
        }
    }
}
