//! Perflab Core - profiling pipeline invocation and metrics rendering
//!
//! Implements the single-shot request flow behind the Perflab console:
//! - Validates run parameters against the configured corpus roots
//! - Invokes the external profiling pipeline as a child process
//! - Parses the CSV metrics artifact the pipeline writes
//! - Renders captured output plus metrics as HTML or JSON

pub mod artifact;
pub mod config;
pub mod error;
pub mod report;
pub mod request;
pub mod runner;
pub mod service;
pub mod telemetry;
pub mod upload;

// Re-export key types
pub use artifact::{load_metrics, MetricsTable};
pub use config::{PipelineConfig, DEFAULT_TIMEOUT_SECS};
pub use error::{Result, RunError};
pub use report::{RunReport, ARTIFACT_MISSING_MESSAGE};
pub use request::{validate, Invocation, RunRequest};
pub use runner::{InvocationResult, PipelineRunner};
pub use service::RunService;
pub use telemetry::init_tracing;
pub use upload::{store_upload, StoredUpload};
