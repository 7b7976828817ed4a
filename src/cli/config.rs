//! Configuration management for convstudy
//!
//! Provides TOML-based configuration with defaults and validation.
//! Lookup order: explicit path, `./convstudy.toml`, `~/.convstudy/config.toml`.

use crate::analysis::EstimatorConfig;
use crate::errors::{Result, StudyError};
use crate::report::ReportFormat;
use crate::source::SourceConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "convstudy.toml";

/// Complete configuration for a convergence study
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub study: StudyConfig,

    /// Deployment mode of the error source; no default
    #[serde(default)]
    pub source: Option<SourceConfig>,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Spacings, test cases and refinement ratio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyConfig {
    pub spacings: Vec<f64>,
    pub test_cases: Vec<String>,
    pub refinement_ratio: f64,
}

/// Report artifact location and format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: String,
    pub format: ReportFormat,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            spacings: vec![0.1, 0.05, 0.025, 0.0125],
            test_cases: vec!["Minkowski".to_string(), "Schwarzschild".to_string()],
            refinement_ratio: 2.0,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: "convergence.jsonl".to_string(),
            format: ReportFormat::Jsonl,
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            Self::load_from_file(&config_path)
        } else {
            Self::load_default()
        }
    }

    /// Load configuration from specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            StudyError::ConfigError(format!("Failed to read config {}: {}", path.display(), e))
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| {
            StudyError::ConfigError(format!("Failed to parse config {}: {}", path.display(), e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load from the working directory or home directory, else built-in defaults
    pub fn load_default() -> Result<Self> {
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            return Self::load_from_file(&local);
        }

        if let Some(home) = dirs::home_dir() {
            let config_path = home.join(".convstudy").join("config.toml");
            if config_path.exists() {
                return Self::load_from_file(&config_path);
            }
        }

        Ok(Config::default())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.study.spacings.is_empty() {
            return Err(StudyError::ConfigError("spacings must not be empty".to_string()));
        }

        if let Some(h) = self.study.spacings.iter().find(|h| !h.is_finite() || **h <= 0.0) {
            return Err(StudyError::ConfigError(format!(
                "spacings must be finite and positive, got {}",
                h
            )));
        }

        if self.study.test_cases.is_empty() {
            return Err(StudyError::ConfigError("test_cases must not be empty".to_string()));
        }

        for (i, case) in self.study.test_cases.iter().enumerate() {
            if case.trim().is_empty() {
                return Err(StudyError::ConfigError("test case names must not be blank".to_string()));
            }
            if self.study.test_cases[..i].contains(case) {
                return Err(StudyError::ConfigError(format!("duplicate test case: {}", case)));
            }
        }

        if !self.study.refinement_ratio.is_finite() || self.study.refinement_ratio <= 1.0 {
            return Err(StudyError::ConfigError(format!(
                "refinement_ratio must be greater than 1, got {}",
                self.study.refinement_ratio
            )));
        }

        if self.output.path.trim().is_empty() {
            return Err(StudyError::ConfigError("output path must not be empty".to_string()));
        }

        Ok(())
    }

    /// The configured error source, required before running a study
    pub fn source(&self) -> Result<&SourceConfig> {
        self.source.as_ref().ok_or_else(|| {
            StudyError::ConfigError(
                "no [source] section: set kind = \"process\", \"synthetic\" or \"tabulated\"".to_string(),
            )
        })
    }

    /// Estimator settings derived from the study section
    pub fn estimator_config(&self) -> EstimatorConfig {
        EstimatorConfig {
            refinement_ratio: self.study.refinement_ratio,
            ..Default::default()
        }
    }

    /// Expand `~/` in every path-valued setting
    pub fn expand_paths(&mut self) {
        self.output.path = Self::expand_path(&self.output.path).to_string_lossy().into_owned();
        match &mut self.source {
            Some(SourceConfig::Synthetic(c)) => {
                c.baseline = Self::expand_path(&c.baseline.to_string_lossy());
            }
            Some(SourceConfig::Process(c)) => {
                if let Some(dir) = &c.working_dir {
                    c.working_dir = Some(Self::expand_path(&dir.to_string_lossy()));
                }
            }
            Some(SourceConfig::Tabulated(_)) | None => {}
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = self.to_toml()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StudyError::ConfigError(format!("Failed to create config dir: {}", e))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| StudyError::ConfigError(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Serialize to pretty TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| StudyError::ConfigError(format!("Failed to serialize config: {}", e)))
    }

    /// Expand tilde in paths
    pub fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{ProcessConfig, SyntheticConfig};
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.study.spacings, vec![0.1, 0.05, 0.025, 0.0125]);
        assert_eq!(config.study.test_cases, vec!["Minkowski", "Schwarzschild"]);
        assert_eq!(config.output.format, ReportFormat::Jsonl);
        assert!(config.source.is_none());
    }

    #[test]
    fn test_config_validation_success() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_default_has_no_source() {
        let err = Config::default().source().unwrap_err();
        assert!(err.to_string().contains("[source]"));
    }

    #[test]
    fn test_config_validation_empty_spacings() {
        let mut config = Config::default();
        config.study.spacings.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_negative_spacing() {
        let mut config = Config::default();
        config.study.spacings.push(-0.1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_duplicate_case() {
        let mut config = Config::default();
        config.study.test_cases.push("Minkowski".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_ratio() {
        let mut config = Config::default();
        config.study.refinement_ratio = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_process_config() {
        let config: Config = toml::from_str(
            r#"
            [study]
            spacings = [0.2, 0.1]
            test_cases = ["Kerr"]

            [source]
            kind = "process"
            program = "./validate"
            args = ["--dr", "{h}", "--test", "{test}"]

            [output]
            path = "out/kerr.am"
            format = "asciimath"
            "#,
        )
        .unwrap();

        assert_eq!(config.study.refinement_ratio, 2.0);
        assert_eq!(config.output.format, ReportFormat::Asciimath);
        match config.source().unwrap() {
            SourceConfig::Process(p) => {
                assert_eq!(p.program, "./validate");
                assert_eq!(p.l2_label, "L2");
            }
            other => panic!("unexpected source: {:?}", other),
        }
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("convstudy.toml");

        let mut config = Config::default();
        config.source = Some(SourceConfig::Synthetic(SyntheticConfig::new("validation_results.tex")));
        config.save(&path).unwrap();

        let loaded = Config::load(Some(path)).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_invalid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[study]\nspacings = []\n").unwrap();
        assert!(Config::load_from_file(&path).is_err());
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let expanded = Config::expand_path("~/results.jsonl");
        assert!(!expanded.to_string_lossy().contains('~'));
    }

    #[test]
    fn test_expand_path_without_tilde() {
        let path = "/absolute/path";
        assert_eq!(Config::expand_path(path).to_string_lossy(), path);
    }

    #[test]
    fn test_expand_paths_process_dir() {
        let mut config = Config::default();
        config.source = Some(SourceConfig::Process(ProcessConfig {
            working_dir: Some(PathBuf::from("~/solver")),
            ..ProcessConfig::new("validate")
        }));
        config.expand_paths();
        match config.source.unwrap() {
            SourceConfig::Process(p) => {
                assert!(!p.working_dir.unwrap().to_string_lossy().starts_with('~'))
            }
            _ => unreachable!(),
        }
    }
}
