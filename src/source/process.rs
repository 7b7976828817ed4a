//! Subprocess-backed error source
//!
//! Runs the validation executable once per (test case, spacing) and reads
//! the two norms from its standard output.
//!
//! # Placeholders
//! - `{h}`    : grid spacing
//! - `{test}` : test case identifier
//!
//! Arguments are passed as an argv array, never through a shell.

use crate::source::parser::{extract_metric, metric_pattern};
use crate::source::{ErrorSource, NormErrors, SourceError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

/// Maximum stderr bytes kept in a [`SourceError::NonZeroExit`]
const MAX_STDERR_BYTES: usize = 4096;

/// Validator invocation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessConfig {
    /// Executable to run
    pub program: String,

    /// Argument template
    #[serde(default = "default_args")]
    pub args: Vec<String>,

    /// Working directory for the validator
    #[serde(default)]
    pub working_dir: Option<PathBuf>,

    /// Label preceding the L2 value in the output
    #[serde(default = "default_l2_label")]
    pub l2_label: String,

    /// Label preceding the Linf value in the output
    #[serde(default = "default_linf_label")]
    pub linf_label: String,
}

fn default_args() -> Vec<String> {
    vec!["{test}".to_string(), "{h}".to_string()]
}

fn default_l2_label() -> String {
    "L2".to_string()
}

fn default_linf_label() -> String {
    "Linf".to_string()
}

impl ProcessConfig {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: default_args(),
            working_dir: None,
            l2_label: default_l2_label(),
            linf_label: default_linf_label(),
        }
    }
}

/// Error source running an external validator
pub struct ProcessSource {
    config: ProcessConfig,
    l2_pattern: Regex,
    linf_pattern: Regex,
}

impl ProcessSource {
    pub fn new(config: ProcessConfig) -> Result<Self, SourceError> {
        let l2_pattern = metric_pattern(&config.l2_label)?;
        let linf_pattern = metric_pattern(&config.linf_label)?;
        Ok(Self {
            config,
            l2_pattern,
            linf_pattern,
        })
    }

    /// Expand the argument template for one run
    pub fn command_args(&self, test_case: &str, spacing: f64) -> Vec<String> {
        let h = spacing.to_string();
        self.config
            .args
            .iter()
            .map(|arg| arg.replace("{h}", &h).replace("{test}", test_case))
            .collect()
    }

    /// Extract both norms from validator output
    pub fn parse_output(&self, stdout: &str) -> Result<NormErrors, SourceError> {
        let l2 = extract_metric(&self.l2_pattern, &self.config.l2_label, stdout)?;
        let linf = extract_metric(&self.linf_pattern, &self.config.linf_label, stdout)?;
        Ok(NormErrors::new(l2, linf))
    }
}

impl ErrorSource for ProcessSource {
    fn name(&self) -> &str {
        "process"
    }

    fn get_errors(&self, test_case: &str, spacing: f64) -> Result<NormErrors, SourceError> {
        let args = self.command_args(test_case, spacing);
        debug!(program = %self.config.program, ?args, "running validator");

        let mut cmd = Command::new(&self.config.program);
        cmd.args(&args);
        if let Some(dir) = &self.config.working_dir {
            cmd.current_dir(dir);
        }

        let output = cmd.output().map_err(|e| SourceError::Spawn {
            program: self.config.program.clone(),
            source: e,
        })?;

        if !output.status.success() {
            let mut stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            if stderr.len() > MAX_STDERR_BYTES {
                let mut cut = MAX_STDERR_BYTES;
                while !stderr.is_char_boundary(cut) {
                    cut -= 1;
                }
                stderr.truncate(cut);
            }
            return Err(SourceError::NonZeroExit {
                program: self.config.program.clone(),
                code: output.status.code(),
                stderr,
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        self.parse_output(&stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell_source(script: &str) -> ProcessSource {
        let config = ProcessConfig {
            program: "sh".to_string(),
            args: vec![
                "-c".to_string(),
                script.to_string(),
                "validator".to_string(),
                "{test}".to_string(),
                "{h}".to_string(),
            ],
            ..ProcessConfig::new("sh")
        };
        ProcessSource::new(config).unwrap()
    }

    #[test]
    fn test_command_args_substitution() {
        let source = ProcessSource::new(ProcessConfig {
            args: vec!["--case={test}".to_string(), "--dr".to_string(), "{h}".to_string()],
            ..ProcessConfig::new("validate")
        })
        .unwrap();

        assert_eq!(
            source.command_args("Minkowski", 0.0125),
            vec!["--case=Minkowski", "--dr", "0.0125"]
        );
    }

    #[test]
    fn test_default_args() {
        let source = ProcessSource::new(ProcessConfig::new("validate")).unwrap();
        assert_eq!(source.command_args("A", 0.1), vec!["A", "0.1"]);
    }

    #[test]
    fn test_parse_output_custom_labels() {
        let source = ProcessSource::new(ProcessConfig {
            l2_label: "rms".to_string(),
            linf_label: "max".to_string(),
            ..ProcessConfig::new("validate")
        })
        .unwrap();

        let errors = source.parse_output("rms = 1e-3\nmax = 4e-3\n").unwrap();
        assert_eq!(errors, NormErrors::new(1e-3, 4e-3));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_validator() {
        let source = shell_source(r#"echo "case $1"; echo "L2 error = $2"; echo "Linf error = $2""#);
        let errors = source.get_errors("Minkowski", 0.05).unwrap();
        assert_eq!(errors, NormErrors::new(0.05, 0.05));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_zero_exit() {
        let source = shell_source("echo boom >&2; exit 3");
        let err = source.get_errors("Minkowski", 0.05).unwrap_err();
        match err {
            SourceError::NonZeroExit { code, stderr, .. } => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_missing_metric_in_output() {
        let source = shell_source(r#"echo "L2 error = 1e-3""#);
        let err = source.get_errors("Minkowski", 0.05).unwrap_err();
        assert!(matches!(err, SourceError::MissingMetric { ref label } if label == "Linf"));
    }

    #[test]
    fn test_spawn_failure() {
        let source = ProcessSource::new(ProcessConfig::new("/nonexistent/convstudy-validator")).unwrap();
        let err = source.get_errors("A", 0.1).unwrap_err();
        assert!(matches!(err, SourceError::Spawn { .. }));
    }
}
