//! Observed convergence order estimation
//!
//! Assuming error ≈ C·hᵖ at two spacings, dividing the two equations gives
//! p = ln(e_coarse / e_fine) / ln(h_coarse / h_fine).

use crate::analysis::types::{Observation, OrderRecord, Report, ReportHeader};
use crate::errors::{Result, StudyError};
use crate::source::{ErrorSource, NormErrors};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

/// Default refinement ratio between successive spacings
pub const DEFAULT_REFINEMENT_RATIO: f64 = 2.0;

/// Default relative tolerance on the refinement ratio
pub const DEFAULT_RATIO_TOLERANCE: f64 = 1e-6;

/// Compute the observed order between two refinement levels
///
/// # Errors
/// - [`StudyError::DomainError`] if either error or spacing is not finite
///   and positive, or if the two spacings are equal.
pub fn compute_order(h_fine: f64, h_coarse: f64, error_fine: f64, error_coarse: f64) -> Result<f64> {
    let undefined = |reason: &'static str| StudyError::DomainError {
        reason,
        test_case: None,
        norm: None,
        h_fine,
        h_coarse,
        error_fine,
        error_coarse,
    };

    if !h_fine.is_finite() || h_fine <= 0.0 {
        return Err(undefined("h_fine must be finite and positive"));
    }
    if !h_coarse.is_finite() || h_coarse <= 0.0 {
        return Err(undefined("h_coarse must be finite and positive"));
    }
    if h_fine == h_coarse {
        return Err(undefined("spacings are equal"));
    }
    if !error_fine.is_finite() || error_fine <= 0.0 {
        return Err(undefined("error_fine must be finite and positive"));
    }
    if !error_coarse.is_finite() || error_coarse <= 0.0 {
        return Err(undefined("error_coarse must be finite and positive"));
    }

    // Difference of logs; the plain ratio overflows for extreme magnitudes
    let order = (error_coarse.ln() - error_fine.ln()) / (h_coarse.ln() - h_fine.ln());
    if !order.is_finite() {
        return Err(undefined("order is not finite"));
    }
    Ok(order)
}

/// Estimator configuration
#[derive(Debug, Clone)]
pub struct EstimatorConfig {
    /// Expected ratio h_coarse / h_fine between successive spacings
    pub refinement_ratio: f64,

    /// Relative tolerance when checking the refinement ratio
    pub ratio_tolerance: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            refinement_ratio: DEFAULT_REFINEMENT_RATIO,
            ratio_tolerance: DEFAULT_RATIO_TOLERANCE,
        }
    }
}

/// Builds convergence reports from an error source
#[derive(Debug, Clone, Default)]
pub struct ConvergenceEstimator {
    config: EstimatorConfig,
}

impl ConvergenceEstimator {
    /// Create estimator with default configuration
    pub fn new() -> Self {
        Self::with_config(EstimatorConfig::default())
    }

    /// Create estimator with custom configuration
    pub fn with_config(config: EstimatorConfig) -> Self {
        Self { config }
    }

    /// Get configuration
    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Sort spacings coarsest to finest and check every successive pair
    /// against the refinement ratio.
    pub fn normalize_spacings(&self, spacings: &[f64]) -> Result<Vec<f64>> {
        if let Some(bad) = spacings.iter().find(|h| !h.is_finite() || **h <= 0.0) {
            return Err(StudyError::InvalidSpacings(format!(
                "spacing {} is not finite and positive",
                bad
            )));
        }

        let mut normalized = spacings.to_vec();
        normalized.sort_by(|a, b| b.total_cmp(a));

        let ratio = self.config.refinement_ratio;
        for pair in normalized.windows(2) {
            let observed = pair[0] / pair[1];
            // Negated so a NaN ratio or tolerance rejects the pair
            if !(((observed - ratio) / ratio).abs() <= self.config.ratio_tolerance) {
                return Err(StudyError::InvalidSpacings(format!(
                    "{} -> {} has ratio {}, expected {}",
                    pair[0], pair[1], observed, ratio
                )));
            }
        }

        Ok(normalized)
    }

    /// Build a report stamped with the current time
    pub fn build_report(
        &self,
        spacings: &[f64],
        test_cases: &[String],
        source: &dyn ErrorSource,
    ) -> Result<Report> {
        self.build_report_at(spacings, test_cases, source, Utc::now())
    }

    /// Build a report with an explicit generation timestamp
    ///
    /// The source is queried exactly once per (test case, spacing) pair,
    /// test cases outermost and spacings coarsest to finest. Any failure
    /// aborts the build.
    pub fn build_report_at(
        &self,
        spacings: &[f64],
        test_cases: &[String],
        source: &dyn ErrorSource,
        generated_at: DateTime<Utc>,
    ) -> Result<Report> {
        let spacings = self.normalize_spacings(spacings)?;

        let mut cases: Vec<String> = Vec::with_capacity(test_cases.len());
        for case in test_cases {
            if !cases.contains(case) {
                cases.push(case.clone());
            }
        }

        info!(
            source = source.name(),
            test_cases = cases.len(),
            spacings = spacings.len(),
            "building convergence report"
        );

        let mut observations = Vec::with_capacity(cases.len() * spacings.len());
        let mut orders = Vec::with_capacity(cases.len() * spacings.len().saturating_sub(1));

        for case in &cases {
            let first = observations.len();

            for &h in &spacings {
                let errors = query(source, case, h)?;
                debug!(test_case = %case, h, l2 = errors.l2, linf = errors.linf, "observation");
                observations.push(Observation::new(case.as_str(), h, errors.l2, errors.linf));
            }

            for pair in observations[first..].windows(2) {
                let record = pair_order(&pair[0], &pair[1])?;
                debug!(
                    test_case = %case,
                    h_fine = record.h_fine,
                    order_l2 = record.order_l2,
                    order_linf = record.order_linf,
                    "order"
                );
                orders.push(record);
            }
        }

        Ok(Report {
            header: ReportHeader {
                spacings,
                test_cases: cases,
                generated_at,
            },
            observations,
            orders,
        })
    }
}

/// Query the source once, rejecting values that cannot be errors
fn query(source: &dyn ErrorSource, case: &str, h: f64) -> Result<NormErrors> {
    let result = source
        .get_errors(case, h)
        .and_then(|errors| errors.validated().map(|_| errors));

    result.map_err(|e| {
        warn!(test_case = %case, h, error = %e, "error source failed");
        StudyError::SourceUnavailable {
            test_case: case.to_string(),
            spacing: h,
            source: e,
        }
    })
}

fn pair_order(coarse: &Observation, fine: &Observation) -> Result<OrderRecord> {
    let order_l2 = compute_order(fine.h, coarse.h, fine.l2_error, coarse.l2_error)
        .map_err(|e| e.in_context(&fine.test_case, "l2"))?;
    let order_linf = compute_order(fine.h, coarse.h, fine.linf_error, coarse.linf_error)
        .map_err(|e| e.in_context(&fine.test_case, "linf"))?;

    Ok(OrderRecord {
        test_case: fine.test_case.clone(),
        h_fine: fine.h,
        h_coarse: coarse.h,
        order_l2,
        order_linf,
    })
}
