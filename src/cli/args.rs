//! Command-line argument parsing for convstudy
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use crate::report::ReportFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// convstudy - Observed convergence orders from grid refinement studies
#[derive(Parser, Debug)]
#[command(name = "convstudy")]
#[command(version)]
#[command(about = "Estimate observed convergence orders from L2/Linf errors at several grid spacings", long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress everything except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the study and write the report
    Run(RunArgs),

    /// Compute a single observed order
    Order {
        /// Finer grid spacing
        #[arg(long)]
        h_fine: f64,

        /// Coarser grid spacing
        #[arg(long)]
        h_coarse: f64,

        /// Error at the finer spacing
        #[arg(long)]
        e_fine: f64,

        /// Error at the coarser spacing
        #[arg(long)]
        e_coarse: f64,
    },

    /// Display resolved configuration
    Config {
        /// Also write the resolved configuration to this file
        #[arg(long, value_name = "PATH")]
        write: Option<PathBuf>,
    },
}

/// Overrides for a study run
#[derive(clap::Args, Debug, Default)]
pub struct RunArgs {
    /// Report output path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum)]
    pub format: Option<ReportFormat>,

    /// Grid spacings, comma separated
    #[arg(long, value_delimiter = ',')]
    pub spacings: Option<Vec<f64>>,

    /// Test cases, comma separated
    #[arg(long, value_delimiter = ',')]
    pub tests: Option<Vec<String>>,

    /// Fail when an observed order is off from this value
    #[arg(long)]
    pub expect_order: Option<f64>,

    /// Allowed distance from the expected order
    #[arg(long, default_value_t = 0.1)]
    pub order_tolerance: f64,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }
}

impl RunArgs {
    /// Check override values before touching the error source
    pub fn validate(&self) -> Result<(), String> {
        if let Some(expected) = self.expect_order {
            if !expected.is_finite() {
                return Err(format!("--expect-order must be finite, got {}", expected));
            }
        }
        if !self.order_tolerance.is_finite() || self.order_tolerance < 0.0 {
            return Err(format!(
                "--order-tolerance must be finite and non-negative, got {}",
                self.order_tolerance
            ));
        }
        Ok(())
    }
}

impl Verbosity {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "quiet",
            Verbosity::Normal => "normal",
            Verbosity::Verbose => "verbose",
            Verbosity::VeryVerbose => "very_verbose",
        }
    }

    /// Default log filter for this level
    pub fn log_filter(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "warn",
            Verbosity::Verbose => "info",
            Verbosity::VeryVerbose => "debug",
        }
    }

    /// Check if should show progress bars
    pub fn show_progress(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }

    /// Check if should print the order summary
    pub fn show_summary(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }
}
