//! Plain-text ledgers written at the end of a batch.
//!
//! The result ledger has one CSV row per frame in completion order:
//!
//! ```text
//! filename,parameter,result
//! f01.npy,upsample:1,success
//! f02_ng.npy,detection failed,failure
//! ```
//!
//! File names containing `,` or `"` are quoted with inner quotes doubled.
//!
//! The not-detected ledger has one `<file> - <reason>` line per failure.

use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

use crate::shared::constants::{FAILURE_SUFFIX, NPY_EXTENSION};

use super::batch_result::BatchResult;
use super::run_state::NotDetected;

pub const RESULT_HEADER: &str = "filename,parameter,result";

const FAILED_PARAMETER: &str = "detection failed";
const UPSAMPLE_PREFIX: &str = "upsample:";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum LedgerParseError {
    #[error("missing header line")]
    MissingHeader,
    #[error("line {line}: {reason}")]
    BadRow { line: usize, reason: String },
}

/// One row of the result ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerRow {
    pub identifier: String,
    pub chosen_level: Option<u32>,
    pub detected: bool,
}

impl From<&BatchResult> for LedgerRow {
    fn from(result: &BatchResult) -> Self {
        Self {
            identifier: result.identifier().to_string(),
            chosen_level: result.chosen_level(),
            detected: result.detected(),
        }
    }
}

fn file_name(identifier: &str, detected: bool) -> String {
    let suffix = if detected { "" } else { FAILURE_SUFFIX };
    format!("{identifier}{suffix}.{NPY_EXTENSION}")
}

fn quote_field(field: &str) -> String {
    if field.contains([',', '"']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn unquote_field(field: &str) -> Option<String> {
    match field.strip_prefix('"') {
        Some(rest) => {
            let inner = rest.strip_suffix('"')?;
            if inner.replace("\"\"", "").contains('"') {
                return None;
            }
            Some(inner.replace("\"\"", "\""))
        }
        None if field.contains('"') => None,
        None => Some(field.to_string()),
    }
}

pub fn render_results(rows: &[LedgerRow]) -> String {
    let mut out = String::from(RESULT_HEADER);
    out.push('\n');
    for row in rows {
        let parameter = match row.chosen_level {
            Some(level) => format!("{UPSAMPLE_PREFIX}{level}"),
            None => FAILED_PARAMETER.to_string(),
        };
        let result = if row.detected { "success" } else { "failure" };
        out.push_str(&format!(
            "{},{parameter},{result}\n",
            quote_field(&file_name(&row.identifier, row.detected))
        ));
    }
    out
}

pub fn render_not_detected(entries: &[NotDetected]) -> String {
    entries
        .iter()
        .map(|e| format!("{} - {}\n", file_name(&e.identifier, false), e.reason))
        .collect()
}

pub fn write_results(path: &Path, rows: &[LedgerRow]) -> io::Result<()> {
    fs::write(path, render_results(rows))
}

pub fn write_not_detected(path: &Path, entries: &[NotDetected]) -> io::Result<()> {
    fs::write(path, render_not_detected(entries))
}

/// Read back a result ledger produced by [`render_results`].
pub fn parse_results(text: &str) -> Result<Vec<LedgerRow>, LedgerParseError> {
    let mut lines = text.lines().enumerate();
    match lines.next() {
        Some((_, header)) if header == RESULT_HEADER => {}
        _ => return Err(LedgerParseError::MissingHeader),
    }

    let mut rows = Vec::new();
    for (i, line) in lines {
        if line.is_empty() {
            continue;
        }
        let bad = |reason: &str| LedgerParseError::BadRow {
            line: i + 1,
            reason: reason.to_string(),
        };

        // Only the file name may contain commas
        let fields: Vec<&str> = line.rsplitn(3, ',').collect();
        let [result, parameter, name] = fields.as_slice() else {
            return Err(bad("expected three fields"));
        };
        let name = unquote_field(name).ok_or_else(|| bad("malformed quoted file name"))?;
        let detected = match *result {
            "success" => true,
            "failure" => false,
            _ => return Err(bad("result must be success or failure")),
        };
        let stem = name
            .strip_suffix(&format!(".{NPY_EXTENSION}"))
            .ok_or_else(|| bad("file name must end in .npy"))?;
        let identifier = if detected {
            stem
        } else {
            stem.strip_suffix(FAILURE_SUFFIX)
                .ok_or_else(|| bad("failed file name lacks the failure suffix"))?
        };
        let chosen_level = match parameter.strip_prefix(UPSAMPLE_PREFIX) {
            Some(level) => Some(level.parse().map_err(|_| bad("bad upsample level"))?),
            None if *parameter == FAILED_PARAMETER => None,
            None => return Err(bad("unknown parameter")),
        };

        rows.push(LedgerRow {
            identifier: identifier.to_string(),
            chosen_level,
            detected,
        });
    }
    Ok(rows)
}
