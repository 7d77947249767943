//! Run report rendering.
//!
//! Rendering is pure: identical reports produce byte-identical bodies,
//! and column/row order always mirrors the artifact.

use crate::artifact::MetricsTable;
use serde::Serialize;
use serde_json::{json, Value};

/// Message shown when the pipeline exits cleanly without an artifact.
pub const ARTIFACT_MISSING_MESSAGE: &str = "Script ran, but CSV not found.";

/// Everything the client gets back from one successful run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Captured pipeline stdout.
    pub stdout: String,

    /// Artifact file name the pipeline was asked to write.
    pub artifact_name: String,

    /// Parsed metrics; absent when the pipeline wrote no artifact.
    pub table: Option<MetricsTable>,
}

impl RunReport {
    /// Render as an HTML fragment: stdout block, then the metrics table
    /// (or the artifact-missing notice). All values are escaped.
    pub fn to_html(&self) -> String {
        let stdout_block = format!(
            "<h2>Script Output:</h2><pre>{}</pre>",
            html_escape(&self.stdout)
        );

        match &self.table {
            Some(table) => {
                let header: String = table
                    .columns
                    .iter()
                    .map(|column| format!("<th>{}</th>", html_escape(column)))
                    .collect();
                let body: String = table
                    .rows
                    .iter()
                    .map(|row| {
                        let cells: String = row
                            .iter()
                            .map(|value| format!("<td>{}</td>", html_escape(value)))
                            .collect();
                        format!("<tr>{cells}</tr>\n")
                    })
                    .collect();
                format!(
                    "{stdout_block}\n<h2>CSV Output:</h2>\n\
                     <table border=\"1\" cellpadding=\"5\" cellspacing=\"0\">\n\
                     <thead>\n<tr>{header}</tr>\n</thead>\n\
                     <tbody>\n{body}</tbody>\n</table>"
                )
            }
            None => format!("{stdout_block}\n<pre>{ARTIFACT_MISSING_MESSAGE}</pre>"),
        }
    }

    /// Render as a JSON document with fields `stdout`, `artifact`, and
    /// `table` (plus `message` when the artifact is missing).
    pub fn to_json(&self) -> Value {
        match &self.table {
            Some(table) => json!({
                "stdout": self.stdout,
                "artifact": self.artifact_name,
                "table": table,
            }),
            None => json!({
                "stdout": self.stdout,
                "artifact": self.artifact_name,
                "table": Value::Null,
                "message": ARTIFACT_MISSING_MESSAGE,
            }),
        }
    }
}

/// Minimal HTML escaping for text and attribute positions.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
