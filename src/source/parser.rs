//! Regex extraction of error values from validator output and tex tables

use crate::source::SourceError;
use regex::Regex;

/// Floating-point literal as printed by validators
pub const NUMBER: &str = r"[-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?";

/// Pattern for `<label>[ error][:|=] <number>`
///
/// Accepts `L2 error = 1.0e-3`, `L2: 1.0e-3`, `Linf_error=2e-3`.
pub fn metric_pattern(label: &str) -> Result<Regex, SourceError> {
    let pattern = format!(
        r"{}{}(?:[\s_-]*error)?\b\s*[:=]?\s*({})",
        leading_boundary(label),
        regex::escape(label),
        NUMBER
    );
    Ok(Regex::new(&pattern)?)
}

/// Pattern for a tex table row `<test> & <l2> & <linf>`
pub fn table_row_pattern(test_case: &str) -> Result<Regex, SourceError> {
    let pattern = format!(
        r"{}{}\s*&\s*({})\s*&\s*({})",
        leading_boundary(test_case),
        regex::escape(test_case),
        NUMBER,
        NUMBER
    );
    Ok(Regex::new(&pattern)?)
}

/// Extract the first value matched by `pattern` in `text`
pub fn extract_metric(pattern: &Regex, label: &str, text: &str) -> Result<f64, SourceError> {
    let caps = pattern
        .captures(text)
        .ok_or_else(|| SourceError::MissingMetric { label: label.to_string() })?;
    parse_number(label, &caps[1])
}

/// Find the `(l2, linf)` pair of `test_case` in a tex table
pub fn parse_table_row(text: &str, test_case: &str) -> Result<Option<(f64, f64)>, SourceError> {
    let pattern = table_row_pattern(test_case)?;
    match pattern.captures(text) {
        Some(caps) => Ok(Some((
            parse_number("L2", &caps[1])?,
            parse_number("Linf", &caps[2])?,
        ))),
        None => Ok(None),
    }
}

fn parse_number(label: &str, text: &str) -> Result<f64, SourceError> {
    text.parse::<f64>().map_err(|_| SourceError::Unparsable {
        label: label.to_string(),
        text: text.to_string(),
    })
}

// `\b` only makes sense before a word character
fn leading_boundary(literal: &str) -> &'static str {
    match literal.chars().next() {
        Some(c) if c.is_alphanumeric() || c == '_' => r"\b",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_labelled_values() {
        let output = "step 400 done\nL2 error = 1.25e-04\nLinf error: 3.5E-4\n";
        let l2 = metric_pattern("L2").unwrap();
        let linf = metric_pattern("Linf").unwrap();
        assert_eq!(extract_metric(&l2, "L2", output).unwrap(), 1.25e-4);
        assert_eq!(extract_metric(&linf, "Linf", output).unwrap(), 3.5e-4);
    }

    #[test]
    fn test_extract_compact_forms() {
        let output = "L2_error=0.002 Linf=.004";
        let l2 = metric_pattern("L2").unwrap();
        let linf = metric_pattern("Linf").unwrap();
        assert_eq!(extract_metric(&l2, "L2", output).unwrap(), 0.002);
        assert_eq!(extract_metric(&linf, "Linf", output).unwrap(), 0.004);
    }

    #[test]
    fn test_label_is_not_a_prefix_match() {
        let output = "XL2 = 5.0\nL2 = 1.0";
        let l2 = metric_pattern("L2").unwrap();
        assert_eq!(extract_metric(&l2, "L2", output).unwrap(), 1.0);
    }

    #[test]
    fn test_missing_metric() {
        let l2 = metric_pattern("L2").unwrap();
        let err = extract_metric(&l2, "L2", "no numbers here").unwrap_err();
        assert!(matches!(err, SourceError::MissingMetric { .. }));
    }

    #[test]
    fn test_table_row() {
        let tex = r"
\begin{tabular}{lcc}
Test & $L_2$ & $L_\infty$ \\
Minkowski & 1.2e-06 & 3.4e-06 \\
Schwarzschild & 2.5e-03 & 7.1e-03 \\
\end{tabular}";
        assert_eq!(parse_table_row(tex, "Minkowski").unwrap(), Some((1.2e-6, 3.4e-6)));
        assert_eq!(parse_table_row(tex, "Schwarzschild").unwrap(), Some((2.5e-3, 7.1e-3)));
        assert_eq!(parse_table_row(tex, "Kerr").unwrap(), None);
    }

    #[test]
    fn test_table_row_escapes_test_name() {
        let tex = "Kerr (a=0.5) & 1.0 & 2.0 \\\\";
        assert_eq!(parse_table_row(tex, "Kerr (a=0.5)").unwrap(), Some((1.0, 2.0)));
    }
}
