//! Synthetic error source scaled from baseline validation results
//!
//! Reads `<test> & <l2> & <linf>` rows from a tex table and assumes the
//! theoretical order holds exactly:
//!
//! `e(h) = max(e_base, floor) · (h / h_ref)^p`
//!
//! Orders computed from this source reproduce `p`; it does not exercise the
//! solver itself.

use crate::source::parser::parse_table_row;
use crate::source::{ErrorSource, NormErrors, SourceError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_REFERENCE_SPACING: f64 = 0.01;
pub const DEFAULT_ASSUMED_ORDER: f64 = 2.0;
pub const DEFAULT_ERROR_FLOOR: f64 = 1e-5;

/// Synthetic scaling settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticConfig {
    /// Tex file holding the baseline table
    pub baseline: PathBuf,

    /// Spacing at which the baseline errors were measured
    #[serde(default = "default_reference_spacing")]
    pub reference_spacing: f64,

    /// Theoretical order used for scaling
    #[serde(default = "default_assumed_order")]
    pub assumed_order: f64,

    /// Lower bound applied to baseline errors
    #[serde(default = "default_error_floor")]
    pub error_floor: f64,
}

fn default_reference_spacing() -> f64 {
    DEFAULT_REFERENCE_SPACING
}

fn default_assumed_order() -> f64 {
    DEFAULT_ASSUMED_ORDER
}

fn default_error_floor() -> f64 {
    DEFAULT_ERROR_FLOOR
}

impl SyntheticConfig {
    pub fn new(baseline: impl Into<PathBuf>) -> Self {
        Self {
            baseline: baseline.into(),
            reference_spacing: DEFAULT_REFERENCE_SPACING,
            assumed_order: DEFAULT_ASSUMED_ORDER,
            error_floor: DEFAULT_ERROR_FLOOR,
        }
    }
}

/// Error source scaling baseline errors by hᵖ
pub struct SyntheticSource {
    config: SyntheticConfig,
}

impl SyntheticSource {
    pub fn new(config: SyntheticConfig) -> Self {
        Self { config }
    }

    /// Scale one baseline value to `spacing`
    pub fn scale(&self, baseline: f64, spacing: f64) -> f64 {
        baseline.max(self.config.error_floor)
            * (spacing / self.config.reference_spacing).powf(self.config.assumed_order)
    }
}

impl ErrorSource for SyntheticSource {
    fn name(&self) -> &str {
        "synthetic"
    }

    // The table is re-read on every call so each build sees the file as it is now.
    fn get_errors(&self, test_case: &str, spacing: f64) -> Result<NormErrors, SourceError> {
        let path = &self.config.baseline;
        let text = std::fs::read_to_string(path).map_err(|e| SourceError::Io {
            path: path.clone(),
            source: e,
        })?;

        let (l2, linf) = parse_table_row(&text, test_case)?.ok_or_else(|| SourceError::MissingRow {
            test_case: test_case.to_string(),
            path: path.clone(),
        })?;

        Ok(NormErrors::new(self.scale(l2, spacing), self.scale(linf, spacing)))
    }
}
