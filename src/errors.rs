//! Error types for convstudy
//!
//! Two kinds are fatal to a report build: an undefined convergence order
//! ([`StudyError::DomainError`]) and an error source that could not deliver
//! a value ([`StudyError::SourceUnavailable`]). The rest cover configuration
//! and output I/O.

use crate::source::SourceError;
use thiserror::Error;

/// Main error type for convergence studies
#[derive(Error, Debug)]
pub enum StudyError {
    /// Observed order is mathematically undefined
    #[error(
        "Convergence order undefined for {}{}: {reason} \
         (h_fine={h_fine}, h_coarse={h_coarse}, error_fine={error_fine}, error_coarse={error_coarse})",
        .test_case.as_deref().unwrap_or("<unnamed>"),
        .norm.map(|n| format!(" [{}]", n)).unwrap_or_default()
    )]
    DomainError {
        reason: &'static str,
        test_case: Option<String>,
        norm: Option<&'static str>,
        h_fine: f64,
        h_coarse: f64,
        error_fine: f64,
        error_coarse: f64,
    },

    /// Error source failed for one (test case, spacing) pair
    #[error("Error source unavailable for test case '{test_case}' at h={spacing}: {source}")]
    SourceUnavailable {
        test_case: String,
        spacing: f64,
        #[source]
        source: SourceError,
    },

    /// Spacing sequence cannot be paired by the refinement ratio
    #[error("Invalid grid spacings: {0}")]
    InvalidSpacings(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Report file does not follow the record layout
    #[error("Malformed report at line {line}: {reason}")]
    MalformedReport { line: usize, reason: String },

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result type alias for study operations
pub type Result<T> = std::result::Result<T, StudyError>;

impl StudyError {
    /// True for errors caused by mathematically undefined orders
    pub fn is_domain(&self) -> bool {
        matches!(self, StudyError::DomainError { .. })
    }

    /// True for errors raised because the error source failed
    pub fn is_source_unavailable(&self) -> bool {
        matches!(self, StudyError::SourceUnavailable { .. })
    }

    /// Attach the test case and norm to a domain error raised by `compute_order`
    pub(crate) fn in_context(self, case: &str, norm_label: &'static str) -> Self {
        match self {
            StudyError::DomainError {
                reason,
                h_fine,
                h_coarse,
                error_fine,
                error_coarse,
                ..
            } => StudyError::DomainError {
                reason,
                test_case: Some(case.to_string()),
                norm: Some(norm_label),
                h_fine,
                h_coarse,
                error_fine,
                error_coarse,
            },
            other => other,
        }
    }
}
