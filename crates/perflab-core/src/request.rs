//! Run request validation.
//!
//! Raw client parameters become an [`Invocation`] with fully resolved
//! paths, or an invalid-input error. Nothing is spawned until a request
//! has passed through [`validate`].

use crate::config::PipelineConfig;
use crate::error::{Result, RunError};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// Raw run parameters as received from a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRequest {
    /// Source file name, relative to the input root.
    pub source_file: String,

    /// PAPI event names, in the order they were given.
    pub events: Vec<String>,

    /// Artifact file name, relative to the output root. A timestamped
    /// name is generated when absent.
    pub output_file: Option<String>,
}

impl RunRequest {
    /// Create a request with a generated output name.
    pub fn new(source_file: impl Into<String>, events: Vec<String>) -> Self {
        Self {
            source_file: source_file.into(),
            events,
            output_file: None,
        }
    }

    /// Pin the artifact name instead of generating one.
    pub fn with_output_file(mut self, name: impl Into<String>) -> Self {
        self.output_file = Some(name.into());
        self
    }

    /// Split a comma-separated event list, trimming entries and dropping
    /// empty segments.
    pub fn parse_events(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }
}

/// A validated invocation with fully resolved paths.
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Resolved source file under the input root.
    pub input_path: PathBuf,

    /// Events, order preserved.
    pub events: Vec<String>,

    /// Resolved artifact path under the output root.
    pub output_path: PathBuf,

    /// Artifact file name relative to the output root.
    pub artifact_name: String,
}

/// Validate a request against the configured roots.
///
/// Rejects path traversal on both the source and output names and
/// requires at least one non-empty event.
pub fn validate(config: &PipelineConfig, request: &RunRequest) -> Result<Invocation> {
    let source = safe_relative_path(&request.source_file).map_err(|reason| {
        RunError::InvalidInput(format!("source file {:?}: {reason}", request.source_file))
    })?;

    if request.events.is_empty() {
        return Err(RunError::InvalidInput(
            "at least one event is required".to_string(),
        ));
    }
    if request.events.iter().any(|e| e.trim().is_empty()) {
        return Err(RunError::InvalidInput(
            "event names must be non-empty".to_string(),
        ));
    }

    let artifact_name = match &request.output_file {
        Some(name) => {
            safe_relative_path(name).map_err(|reason| {
                RunError::InvalidInput(format!("output file {name:?}: {reason}"))
            })?;
            name.clone()
        }
        None => default_artifact_name(),
    };

    Ok(Invocation {
        input_path: config.input_root.join(&source),
        events: request.events.clone(),
        output_path: config.output_root.join(&artifact_name),
        artifact_name,
    })
}

/// Timestamped default artifact name. Distinct per millisecond; callers
/// reusing explicit names own the disambiguation.
fn default_artifact_name() -> String {
    format!("function_metrics_{}.csv", Utc::now().timestamp_millis())
}

/// Accept only plain relative paths: no absolute paths, no `..`, no `.`,
/// no prefix components.
fn safe_relative_path(raw: &str) -> std::result::Result<PathBuf, &'static str> {
    if raw.is_empty() {
        return Err("empty path");
    }
    let path = Path::new(raw);
    let safe = path.components().all(|c| matches!(c, Component::Normal(_)));
    if !safe {
        return Err("path escapes the permitted root");
    }
    Ok(path.to_path_buf())
}
