//! Terminal display for study runs
//!
//! Progress while the error source is queried, then a colored summary of
//! the observed orders.

use crate::analysis::{OrderDeviation, Report};
use crate::report::asciimath::sci;
use crate::source::{ErrorSource, NormErrors, SourceError};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Error source decorator advancing a progress bar once per query
pub struct ProgressSource<'a> {
    inner: &'a dyn ErrorSource,
    bar: ProgressBar,
}

impl<'a> ProgressSource<'a> {
    /// Wrap `inner`; `total` is the number of (test case, spacing) pairs
    pub fn new(inner: &'a dyn ErrorSource, total: usize, visible: bool) -> Self {
        let bar = if visible {
            ProgressBar::new(total as u64)
        } else {
            ProgressBar::hidden()
        };
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} Validating [{bar:40.cyan/blue}] {pos}/{len} | {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { inner, bar }
    }

    /// Clear the bar from the terminal
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    /// Number of queries made so far
    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

impl ErrorSource for ProgressSource<'_> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn get_errors(&self, test_case: &str, spacing: f64) -> Result<NormErrors, SourceError> {
        self.bar.set_message(format!("{} h={}", test_case, spacing));
        let result = self.inner.get_errors(test_case, spacing);
        self.bar.inc(1);
        result
    }
}

/// Print observed orders per test case
pub fn print_summary(report: &Report) {
    println!("\n{}", "Convergence Study".bold().cyan());
    println!("{}", "=".repeat(60).cyan());

    for case in &report.header.test_cases {
        println!("{}", case.bold());
        for obs in report.observations_for(case) {
            println!(
                "  h={:<8} L2={}  Linf={}",
                obs.h,
                sci(obs.l2_error),
                sci(obs.linf_error)
            );
        }
        for order in report.orders_for(case) {
            println!(
                "  {:.4}->{:.4}  order_2={}  order_inf={}",
                order.h_coarse,
                order.h_fine,
                format!("{:.2}", order.order_l2).green(),
                format!("{:.2}", order.order_linf).green()
            );
        }
    }
    println!();
}

/// Print the outcome of an expected-order check
pub fn print_check(deviations: &[OrderDeviation], expected: f64, tolerance: f64) {
    if deviations.is_empty() {
        println!(
            "{} All observed orders within {} of {}",
            "✓".green(),
            tolerance,
            expected
        );
        return;
    }

    println!(
        "{} {} observed order(s) outside {} ± {}",
        "✗".red(),
        deviations.len(),
        expected,
        tolerance
    );
    for d in deviations {
        println!(
            "  {} {} {:.4}->{:.4}: {}",
            d.test_case,
            d.norm,
            d.h_coarse,
            d.h_fine,
            format!("{:.3}", d.observed).red()
        );
    }
}

/// Display error message
pub fn show_error(error: &str) {
    eprintln!("{} {}", "Error:".red().bold(), error.red());
}
