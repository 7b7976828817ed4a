//! Line-delimited JSON report records
//!
//! One JSON object per line, no enclosing array:
//!
//! ```text
//! {"type":"header","spacings":[0.1,0.05],"test_cases":["A"],"generated_at":"..."}
//! {"type":"test","test_case":"A","h":0.1,"l2_error":0.004,"linf_error":0.009}
//! {"type":"test","test_case":"A","h":0.05,"l2_error":0.001,"linf_error":0.00225}
//! {"type":"order","test_case":"A","h_fine":0.05,"h_coarse":0.1,"order_l2":2.0,"order_linf":2.0}
//! ```
//!
//! Consumers dispatch on the `type` field.

use crate::analysis::types::{Observation, OrderRecord, Report, ReportHeader};
use crate::errors::{Result, StudyError};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};

/// One line of the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReportRecord {
    Header(ReportHeader),
    Test(Observation),
    Order(OrderRecord),
}

impl Report {
    /// Records in output order: header, observations, orders
    pub fn records(&self) -> Vec<ReportRecord> {
        std::iter::once(ReportRecord::Header(self.header.clone()))
            .chain(self.observations.iter().cloned().map(ReportRecord::Test))
            .chain(self.orders.iter().cloned().map(ReportRecord::Order))
            .collect()
    }
}

/// Write `report` as one JSON object per line
pub fn write_jsonl<W: Write>(report: &Report, mut writer: W) -> Result<()> {
    for record in report.records() {
        serde_json::to_writer(&mut writer, &record)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Parse every non-blank line as a record
pub fn read_records<R: BufRead>(reader: R) -> Result<Vec<ReportRecord>> {
    Ok(read_numbered(reader)?.into_iter().map(|(_, record)| record).collect())
}

fn read_numbered<R: BufRead>(reader: R) -> Result<Vec<(usize, ReportRecord)>> {
    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|e| StudyError::MalformedReport {
            line: idx + 1,
            reason: e.to_string(),
        })?;
        records.push((idx + 1, record));
    }
    Ok(records)
}

/// Reassemble a report; the header must come first and appear once
pub fn read_report<R: BufRead>(reader: R) -> Result<Report> {
    let mut records = read_numbered(reader)?.into_iter();

    let header = match records.next() {
        Some((_, ReportRecord::Header(header))) => header,
        Some((line, _)) => {
            return Err(StudyError::MalformedReport {
                line,
                reason: "first record is not a header".to_string(),
            })
        }
        None => {
            return Err(StudyError::MalformedReport {
                line: 0,
                reason: "empty report".to_string(),
            })
        }
    };

    let mut report = Report {
        header,
        observations: Vec::new(),
        orders: Vec::new(),
    };

    for (line, record) in records {
        match record {
            ReportRecord::Test(observation) => report.observations.push(observation),
            ReportRecord::Order(order) => report.orders.push(order),
            ReportRecord::Header(_) => {
                return Err(StudyError::MalformedReport {
                    line,
                    reason: "duplicate header".to_string(),
                })
            }
        }
    }

    Ok(report)
}
