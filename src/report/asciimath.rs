//! AsciiMath convergence tables
//!
//! Human-readable rendering of a report: per test case, one table of errors
//! by spacing and one table of observed orders by refinement pair.

use crate::analysis::types::Report;
use crate::errors::Result;
use std::io::Write;

/// Render `report` as AsciiMath tables
pub fn write_asciimath<W: Write>(report: &Report, mut writer: W) -> Result<()> {
    writeln!(writer, "=== Convergence Study ===")?;
    writeln!(writer)?;

    for case in &report.header.test_cases {
        writeln!(writer, "== {} ==", case)?;
        writeln!(writer, "| h       | L_2 error | L_inf error |")?;
        writeln!(writer, "|---------|-----------|-------------|")?;
        for obs in report.observations_for(case) {
            writeln!(
                writer,
                "| {:.4}  | {}   | {}    |",
                obs.h,
                sci(obs.l2_error),
                sci(obs.linf_error)
            )?;
        }
        writeln!(writer)?;

        writeln!(writer, "| Pair           | order_2 | order_inf |")?;
        writeln!(writer, "|----------------|---------|-----------|")?;
        for order in report.orders_for(case) {
            let pair = format!("{:.4}->{:.4}", order.h_coarse, order.h_fine);
            writeln!(
                writer,
                "| {} | {:.2}    | {:.2}      |",
                pair, order.order_l2, order.order_linf
            )?;
        }
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}

/// Scientific notation with two decimals and a signed two-digit exponent (`2.50e-04`)
pub fn sci(value: f64) -> String {
    let formatted = format!("{:.2e}", value);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => match exponent.parse::<i32>() {
            Ok(exp) => format!(
                "{}e{}{:02}",
                mantissa,
                if exp < 0 { '-' } else { '+' },
                exp.abs()
            ),
            Err(_) => formatted,
        },
        None => formatted,
    }
}
