//! Report serialization
//!
//! - [`jsonl`]: line-delimited records for programmatic consumers
//! - [`asciimath`]: tables for people

pub mod asciimath;
pub mod jsonl;

pub use asciimath::write_asciimath;
pub use jsonl::{read_records, read_report, write_jsonl, ReportRecord};

use crate::analysis::types::Report;
use crate::errors::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Output artifact format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    #[default]
    Jsonl,
    Asciimath,
}

impl ReportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Jsonl => "jsonl",
            ReportFormat::Asciimath => "asciimath",
        }
    }
}

/// Write `report` in `format`
pub fn write_report<W: Write>(report: &Report, format: ReportFormat, writer: W) -> Result<()> {
    match format {
        ReportFormat::Jsonl => write_jsonl(report, writer),
        ReportFormat::Asciimath => write_asciimath(report, writer),
    }
}

/// Write `report` to `path`, creating parent directories
pub fn write_report_file(report: &Report, format: ReportFormat, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    write_report(report, format, BufWriter::new(file))?;
    tracing::info!(path = %path.display(), format = format.as_str(), "report written");
    Ok(())
}
