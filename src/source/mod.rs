//! Error sources for convergence studies
//!
//! An [`ErrorSource`] delivers the L2 and Linf error of one test case at one
//! grid spacing. The deployment mode is chosen when the study is composed:
//!
//! - [`process`]: run the validation executable and parse its output
//! - [`synthetic`]: scale baseline errors from a tex table by hᵖ
//! - [`tabulated`]: literal values from the configuration file
//!
//! The estimator never branches on which one it was given.

pub mod parser;
pub mod process;
pub mod synthetic;
pub mod tabulated;

pub use process::{ProcessConfig, ProcessSource};
pub use synthetic::{SyntheticConfig, SyntheticSource};
pub use tabulated::{TabulatedConfig, TabulatedEntry, TabulatedSource};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Error pair measured at one spacing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormErrors {
    pub l2: f64,
    pub linf: f64,
}

impl NormErrors {
    pub fn new(l2: f64, linf: f64) -> Self {
        Self { l2, linf }
    }

    /// Reject values that cannot be errors (negative or non-finite)
    pub fn validated(&self) -> Result<(), SourceError> {
        for (label, value) in [("L2", self.l2), ("Linf", self.linf)] {
            if !value.is_finite() || value < 0.0 {
                return Err(SourceError::InvalidValue {
                    label: label.to_string(),
                    value,
                });
            }
        }
        Ok(())
    }
}

/// Failures of an error source
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' exited with status {}: {stderr}", .code.map(|c| c.to_string()).unwrap_or_else(|| "signal".to_string()))]
    NonZeroExit {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("No value for norm label '{label}' in output")]
    MissingMetric { label: String },

    #[error("Cannot parse {label} value '{text}'")]
    Unparsable { label: String, text: String },

    #[error("No row for test case '{test_case}' in {}", .path.display())]
    MissingRow { test_case: String, path: PathBuf },

    #[error("No tabulated entry for test case '{test_case}' at h={spacing}")]
    MissingEntry { test_case: String, spacing: f64 },

    #[error("Invalid {label} value: {value}")]
    InvalidValue { label: String, value: f64 },

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid extraction pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Capability to produce error metrics for (test case, spacing) pairs
pub trait ErrorSource {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Produce the L2 and Linf error of `test_case` at `spacing`
    fn get_errors(&self, test_case: &str, spacing: f64) -> Result<NormErrors, SourceError>;
}

impl<S: ErrorSource + ?Sized> ErrorSource for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn get_errors(&self, test_case: &str, spacing: f64) -> Result<NormErrors, SourceError> {
        (**self).get_errors(test_case, spacing)
    }
}

/// Deployment mode of the error source, as written in the config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    Process(ProcessConfig),
    Synthetic(SyntheticConfig),
    Tabulated(TabulatedConfig),
}

impl SourceConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            SourceConfig::Process(_) => "process",
            SourceConfig::Synthetic(_) => "synthetic",
            SourceConfig::Tabulated(_) => "tabulated",
        }
    }
}

/// Compose the error source selected by configuration
pub fn from_config(config: &SourceConfig) -> Result<Box<dyn ErrorSource>, SourceError> {
    Ok(match config {
        SourceConfig::Process(c) => Box::new(ProcessSource::new(c.clone())?),
        SourceConfig::Synthetic(c) => Box::new(SyntheticSource::new(c.clone())),
        SourceConfig::Tabulated(c) => Box::new(TabulatedSource::new(c.clone())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validated_accepts_zero() {
        assert!(NormErrors::new(0.0, 0.0).validated().is_ok());
    }

    #[test]
    fn test_validated_rejects_negative_and_nan() {
        assert!(NormErrors::new(-1e-3, 1e-3).validated().is_err());
        assert!(NormErrors::new(1e-3, f64::NAN).validated().is_err());
        assert!(NormErrors::new(f64::INFINITY, 1e-3).validated().is_err());
    }

    #[test]
    fn test_source_config_kind_tag() {
        let config: SourceConfig = toml::from_str(
            r#"
            kind = "synthetic"
            baseline = "validation_results.tex"
            "#,
        )
        .unwrap();
        assert_eq!(config.kind(), "synthetic");
    }

    #[test]
    fn test_from_config_names() {
        let config = SourceConfig::Tabulated(TabulatedConfig { entries: vec![] });
        let source = from_config(&config).unwrap();
        assert_eq!(source.name(), "tabulated");
    }

    #[test]
    fn test_non_zero_exit_display() {
        let err = SourceError::NonZeroExit {
            program: "validate".to_string(),
            code: None,
            stderr: "killed".to_string(),
        };
        assert!(err.to_string().contains("signal"));
    }
}
