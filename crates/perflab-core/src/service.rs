//! One-call run orchestration.

use crate::artifact::load_metrics;
use crate::config::PipelineConfig;
use crate::error::{Result, RunError};
use crate::report::RunReport;
use crate::request::{validate, RunRequest};
use crate::runner::PipelineRunner;

/// Runs the full request flow: validation, pipeline invocation, artifact
/// load, and report assembly.
///
/// One instance serves any number of independent requests; it holds no
/// per-request state and nothing is shared between runs beyond the
/// filesystem namespace.
#[derive(Debug, Clone)]
pub struct RunService {
    config: PipelineConfig,
    runner: PipelineRunner,
}

impl RunService {
    /// Create a service for the given configuration.
    pub fn new(config: PipelineConfig) -> Self {
        let runner = PipelineRunner::new(config.clone());
        Self { config, runner }
    }

    /// The configuration this service was built with.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Execute one run end to end.
    ///
    /// A pipeline that exits cleanly without writing its artifact yields a
    /// report without a table; every other artifact problem propagates as
    /// an error.
    pub async fn run(&self, request: &RunRequest) -> Result<RunReport> {
        let invocation = validate(&self.config, request)?;

        tracing::info!(
            source = %invocation.input_path.display(),
            artifact = %invocation.artifact_name,
            events = invocation.events.len(),
            "starting run"
        );

        let result = self.runner.invoke(&invocation).await?;

        let table = match load_metrics(&invocation.output_path) {
            Ok(table) => Some(table),
            Err(RunError::MissingArtifact { path }) => {
                tracing::warn!(path = %path.display(), "pipeline wrote no artifact");
                None
            }
            Err(err) => return Err(err),
        };

        Ok(RunReport {
            stdout: result.stdout,
            artifact_name: invocation.artifact_name,
            table,
        })
    }
}
