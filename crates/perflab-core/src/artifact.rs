//! CSV metrics artifact loading.

use crate::error::{Result, RunError};
use serde::Serialize;
use std::path::Path;

/// Ordered table of per-function metrics parsed from a CSV artifact.
///
/// Column order follows the CSV header; row order follows the file. Every
/// row carries exactly one field per column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsTable {
    /// Column names in header order.
    pub columns: Vec<String>,

    /// Rows in file order.
    pub rows: Vec<Vec<String>>,
}

impl MetricsTable {
    /// Whether the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Load the metrics table from the artifact the pipeline declared.
///
/// A missing file is reported as [`RunError::MissingArtifact`] so callers
/// can downgrade it to a table-less report. Any parse problem (no header
/// row, uneven field counts, invalid UTF-8) is
/// [`RunError::MalformedArtifact`]; no partial table is ever returned.
pub fn load_metrics(path: &Path) -> Result<MetricsTable> {
    if !path.exists() {
        return Err(RunError::MissingArtifact {
            path: path.to_path_buf(),
        });
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|err| malformed(path, err.to_string()))?;

    let headers = reader
        .headers()
        .map_err(|err| malformed(path, err.to_string()))?
        .clone();
    if headers.is_empty() || headers.iter().all(str::is_empty) {
        return Err(malformed(path, "missing header row".to_string()));
    }
    let columns: Vec<String> = headers.iter().map(String::from).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|err| malformed(path, err.to_string()))?;
        rows.push(record.iter().map(String::from).collect());
    }

    tracing::debug!(
        path = %path.display(),
        columns = columns.len(),
        rows = rows.len(),
        "parsed metrics artifact"
    );

    Ok(MetricsTable { columns, rows })
}

fn malformed(path: &Path, reason: String) -> RunError {
    RunError::MalformedArtifact {
        path: path.to_path_buf(),
        reason,
    }
}
