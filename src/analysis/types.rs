//! Convergence study type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Error metrics measured for one test case at one grid spacing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Test case identifier
    pub test_case: String,

    /// Grid spacing h
    pub h: f64,

    /// L2 (root-mean-square) error
    pub l2_error: f64,

    /// Linf (maximum pointwise) error
    pub linf_error: f64,
}

impl Observation {
    /// Create new observation
    pub fn new(test_case: impl Into<String>, h: f64, l2_error: f64, linf_error: f64) -> Self {
        Self {
            test_case: test_case.into(),
            h,
            l2_error,
            linf_error,
        }
    }
}

/// Observed orders between two successive refinements of one test case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    /// Test case identifier
    pub test_case: String,

    /// Finer spacing of the pair
    pub h_fine: f64,

    /// Coarser spacing of the pair (refinement ratio times h_fine)
    pub h_coarse: f64,

    /// Observed order in the L2 norm
    pub order_l2: f64,

    /// Observed order in the Linf norm
    pub order_linf: f64,
}

/// Study metadata written as the first report record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportHeader {
    /// Spacings, coarsest to finest
    pub spacings: Vec<f64>,

    /// Test cases in evaluation order
    pub test_cases: Vec<String>,

    /// Generation timestamp
    pub generated_at: DateTime<Utc>,
}

/// Complete convergence report
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub header: ReportHeader,
    pub observations: Vec<Observation>,
    pub orders: Vec<OrderRecord>,
}

impl Report {
    /// Observations belonging to one test case, coarsest first
    pub fn observations_for<'a>(
        &'a self,
        test_case: &'a str,
    ) -> impl Iterator<Item = &'a Observation> + 'a {
        self.observations
            .iter()
            .filter(move |o| o.test_case == test_case)
    }

    /// Order records belonging to one test case, coarsest pair first
    pub fn orders_for<'a>(
        &'a self,
        test_case: &'a str,
    ) -> impl Iterator<Item = &'a OrderRecord> + 'a {
        self.orders.iter().filter(move |o| o.test_case == test_case)
    }

    /// Order record for the finest pair of a test case (the asymptotic estimate)
    pub fn finest_order<'a>(&'a self, test_case: &'a str) -> Option<&'a OrderRecord> {
        self.orders_for(test_case).last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> Report {
        Report {
            header: ReportHeader {
                spacings: vec![0.1, 0.05, 0.025],
                test_cases: vec!["A".to_string(), "B".to_string()],
                generated_at: Utc::now(),
            },
            observations: vec![
                Observation::new("A", 0.1, 4e-2, 8e-2),
                Observation::new("A", 0.05, 1e-2, 2e-2),
                Observation::new("A", 0.025, 2.5e-3, 5e-3),
                Observation::new("B", 0.1, 1e-1, 1e-1),
                Observation::new("B", 0.05, 5e-2, 5e-2),
                Observation::new("B", 0.025, 2.5e-2, 2.5e-2),
            ],
            orders: vec![
                OrderRecord { test_case: "A".into(), h_fine: 0.05, h_coarse: 0.1, order_l2: 2.0, order_linf: 2.0 },
                OrderRecord { test_case: "A".into(), h_fine: 0.025, h_coarse: 0.05, order_l2: 2.0, order_linf: 2.0 },
                OrderRecord { test_case: "B".into(), h_fine: 0.05, h_coarse: 0.1, order_l2: 1.0, order_linf: 1.0 },
                OrderRecord { test_case: "B".into(), h_fine: 0.025, h_coarse: 0.05, order_l2: 1.0, order_linf: 1.0 },
            ],
        }
    }

    #[test]
    fn test_observations_for() {
        let report = sample_report();
        let hs: Vec<f64> = report.observations_for("B").map(|o| o.h).collect();
        assert_eq!(hs, vec![0.1, 0.05, 0.025]);
        assert_eq!(report.observations_for("missing").count(), 0);
    }

    #[test]
    fn test_finest_order() {
        let report = sample_report();
        let finest = report.finest_order("A").unwrap();
        assert_eq!(finest.h_fine, 0.025);
        assert!(report.finest_order("missing").is_none());
    }
}
