//! Literal pre-tabulated error values

use crate::source::{ErrorSource, NormErrors, SourceError};
use serde::{Deserialize, Serialize};

/// Relative tolerance when matching a requested spacing to a table entry
const SPACING_TOLERANCE: f64 = 1e-9;

/// One tabulated measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabulatedEntry {
    pub test_case: String,
    pub h: f64,
    pub l2: f64,
    pub linf: f64,
}

/// Table of measurements, written as `[[source.entries]]`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TabulatedConfig {
    #[serde(default)]
    pub entries: Vec<TabulatedEntry>,
}

/// Error source backed by a fixed table
pub struct TabulatedSource {
    config: TabulatedConfig,
}

impl TabulatedSource {
    pub fn new(config: TabulatedConfig) -> Self {
        Self { config }
    }

    fn lookup(&self, test_case: &str, spacing: f64) -> Option<&TabulatedEntry> {
        self.config.entries.iter().find(|e| {
            e.test_case == test_case && (e.h - spacing).abs() <= SPACING_TOLERANCE * spacing.abs()
        })
    }
}

impl ErrorSource for TabulatedSource {
    fn name(&self) -> &str {
        "tabulated"
    }

    fn get_errors(&self, test_case: &str, spacing: f64) -> Result<NormErrors, SourceError> {
        self.lookup(test_case, spacing)
            .map(|e| NormErrors::new(e.l2, e.linf))
            .ok_or_else(|| SourceError::MissingEntry {
                test_case: test_case.to_string(),
                spacing,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> TabulatedSource {
        TabulatedSource::new(TabulatedConfig {
            entries: vec![
                TabulatedEntry { test_case: "A".into(), h: 0.1, l2: 4e-3, linf: 9e-3 },
                TabulatedEntry { test_case: "A".into(), h: 0.05, l2: 1e-3, linf: 2.5e-3 },
            ],
        })
    }

    #[test]
    fn test_lookup_with_rounding() {
        let source = table();
        let errors = source.get_errors("A", 0.1 + 1e-13).unwrap();
        assert_eq!(errors, NormErrors::new(4e-3, 9e-3));
    }

    #[test]
    fn test_missing_entry() {
        let source = table();
        assert!(matches!(
            source.get_errors("A", 0.025),
            Err(SourceError::MissingEntry { .. })
        ));
        assert!(source.get_errors("B", 0.1).is_err());
    }

    #[test]
    fn test_entries_from_toml() {
        let config: TabulatedConfig = toml::from_str(
            r#"
            [[entries]]
            test_case = "A"
            h = 0.1
            l2 = 1e-3
            linf = 2e-3
            "#,
        )
        .unwrap();
        assert_eq!(config.entries.len(), 1);
        assert_eq!(config.entries[0].linf, 2e-3);
    }
}
