//! Error taxonomy for the run flow.
//!
//! Every error is local to a single request; nothing is retried and
//! nothing here should ever take down a serving process.

use std::path::PathBuf;

/// Errors produced while handling a single profiling run.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// Request parameters were rejected. Raised before any process is
    /// spawned.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The pipeline executable could not be started.
    #[error("failed to spawn pipeline {executable}: {source}")]
    Spawn {
        executable: String,
        #[source]
        source: std::io::Error,
    },

    /// The pipeline exited with a non-zero status.
    #[error("pipeline exited with status {exit_code}")]
    PipelineFailed {
        exit_code: i32,
        stdout: String,
        stderr: String,
    },

    /// The pipeline outran its wall-clock limit and was killed.
    #[error("pipeline timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// The pipeline succeeded but the declared artifact is absent.
    #[error("artifact not found: {}", path.display())]
    MissingArtifact { path: PathBuf },

    /// The artifact exists but is not parseable as headered CSV.
    #[error("malformed artifact {}: {reason}", path.display())]
    MalformedArtifact { path: PathBuf, reason: String },

    /// Filesystem failure outside the pipeline itself.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl RunError {
    /// Captured stderr, for the variants that carry it. Callers surface
    /// this verbatim rather than summarising it away.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            RunError::PipelineFailed { stderr, .. } => Some(stderr),
            _ => None,
        }
    }
}

/// Result type for run flow operations.
pub type Result<T> = std::result::Result<T, RunError>;
