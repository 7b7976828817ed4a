//! Expected-order verification

use crate::analysis::types::{OrderRecord, Report};

/// One order record that misses the expected order
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDeviation {
    pub test_case: String,
    pub h_fine: f64,
    pub h_coarse: f64,
    /// Norm label, `"l2"` or `"linf"`
    pub norm: &'static str,
    pub observed: f64,
    pub expected: f64,
}

impl OrderDeviation {
    /// Absolute distance from the expected order
    pub fn deviation(&self) -> f64 {
        (self.observed - self.expected).abs()
    }
}

impl Report {
    /// List every order that differs from `expected` by more than `tolerance`
    pub fn check_orders(&self, expected: f64, tolerance: f64) -> Vec<OrderDeviation> {
        self.orders
            .iter()
            .flat_map(|record| deviations(record, expected, tolerance))
            .collect()
    }
}

fn deviations(record: &OrderRecord, expected: f64, tolerance: f64) -> Vec<OrderDeviation> {
    [("l2", record.order_l2), ("linf", record.order_linf)]
        .into_iter()
        // NaN orders never pass
        .filter(|(_, observed)| !((observed - expected).abs() <= tolerance))
        .map(|(norm, observed)| OrderDeviation {
            test_case: record.test_case.clone(),
            h_fine: record.h_fine,
            h_coarse: record.h_coarse,
            norm,
            observed,
            expected,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::types::ReportHeader;
    use chrono::Utc;

    fn report_with(orders: Vec<(f64, f64)>) -> Report {
        Report {
            header: ReportHeader {
                spacings: vec![],
                test_cases: vec!["A".to_string()],
                generated_at: Utc::now(),
            },
            observations: vec![],
            orders: orders
                .into_iter()
                .map(|(l2, linf)| OrderRecord {
                    test_case: "A".to_string(),
                    h_fine: 0.05,
                    h_coarse: 0.1,
                    order_l2: l2,
                    order_linf: linf,
                })
                .collect(),
        }
    }

    #[test]
    fn test_all_within_tolerance() {
        let report = report_with(vec![(2.01, 1.98), (2.0, 2.0)]);
        assert!(report.check_orders(2.0, 0.05).is_empty());
    }

    #[test]
    fn test_deviation_reported_per_norm() {
        let report = report_with(vec![(2.0, 1.5)]);
        let found = report.check_orders(2.0, 0.1);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].norm, "linf");
        assert!((found[0].deviation() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_nan_order_is_deviation() {
        let report = report_with(vec![(f64::NAN, 2.0)]);
        assert_eq!(report.check_orders(2.0, 0.1).len(), 1);
    }
}
