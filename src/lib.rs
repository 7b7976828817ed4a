//! convstudy - Grid convergence studies
//!
//! Queries an error source for L2/Linf errors at several grid spacings,
//! estimates observed convergence orders between successive refinements,
//! and writes a line-delimited report.
//!
//! # Architecture
//!
//! - **analysis**: order formula and report builder
//! - **source**: interchangeable error sources (process, synthetic, tabulated)
//! - **report**: JSONL and AsciiMath writers
//! - **cli**: arguments and TOML configuration

pub mod errors;
pub mod analysis;
pub mod source;
pub mod report;

// Re-export commonly used types
pub use errors::{Result, StudyError};
pub use analysis::{compute_order, ConvergenceEstimator, Report};
pub use source::{ErrorSource, NormErrors};

// Command-line surface
pub mod cli;
pub mod display;
