//! Convergence order estimation and report assembly
//! Provides the log-ratio order formula and the report builder

pub mod check;
pub mod convergence;
pub mod types;

pub use check::OrderDeviation;
pub use convergence::{compute_order, ConvergenceEstimator, EstimatorConfig};
pub use types::{Observation, OrderRecord, Report, ReportHeader};
