//! Pipeline configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default wall-clock limit for one pipeline invocation, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Configuration for the external profiling pipeline.
///
/// Built once at startup and passed explicitly to every component that
/// needs it; there is no process-global configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory holding the test corpus source files (`-i` inputs).
    pub input_root: PathBuf,

    /// Directory the pipeline writes CSV artifacts into (`-o` outputs).
    pub output_root: PathBuf,

    /// Path to the pipeline executable.
    pub executable: PathBuf,

    /// Directory uploaded file bytes are spooled into.
    pub upload_dir: PathBuf,

    /// Timeout in seconds for one invocation (0 = no timeout).
    pub timeout_secs: u64,

    /// Prefix the command with `sudo`. Off unless the deployment
    /// explicitly opts in.
    pub use_sudo: bool,
}

impl PipelineConfig {
    /// Create a configuration rooted at the given directories.
    pub fn new(
        input_root: impl Into<PathBuf>,
        output_root: impl Into<PathBuf>,
        executable: impl Into<PathBuf>,
    ) -> Self {
        Self {
            input_root: input_root.into(),
            output_root: output_root.into(),
            executable: executable.into(),
            upload_dir: PathBuf::from("uploads"),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            use_sudo: false,
        }
    }

    /// Override the invocation timeout.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Run the pipeline under `sudo`.
    pub fn with_sudo(mut self) -> Self {
        self.use_sudo = true;
        self
    }

    /// Redirect the upload spool directory.
    pub fn with_upload_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.upload_dir = dir.into();
        self
    }
}
