//! Server configuration.

use perflab_core::PipelineConfig;
use serde::{Deserialize, Serialize};

/// Default listen port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default multipart upload limit in bytes (8 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 8 * 1024 * 1024;

/// Configuration for one server instance. No hidden globals; every
/// instance is constructed from one of these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// TCP port to listen on.
    pub port: u16,

    /// Largest accepted multipart body, in bytes.
    pub max_upload_bytes: usize,

    /// Pipeline configuration handed to the run flow.
    pub pipeline: PipelineConfig,
}

impl ServerConfig {
    /// Create a server configuration around a pipeline configuration.
    pub fn new(pipeline: PipelineConfig) -> Self {
        Self {
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            pipeline,
        }
    }

    /// Override the listen port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Override the upload size limit.
    pub fn with_max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = bytes;
        self
    }
}
