//! Pipeline process execution.

use crate::config::PipelineConfig;
use crate::error::{Result, RunError};
use crate::request::Invocation;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;

/// Captured outcome of one pipeline invocation.
#[derive(Debug, Clone)]
pub struct InvocationResult {
    /// Exit code (0 = success).
    pub exit_code: i32,

    /// Captured stdout.
    pub stdout: String,

    /// Captured stderr.
    pub stderr: String,

    /// Duration in milliseconds.
    pub duration_ms: u64,
}

/// Executes the external profiling pipeline for validated invocations.
///
/// The pipeline is an opaque collaborator; this type owns safe argument
/// construction, process lifecycle, and output capture, nothing more.
#[derive(Debug, Clone)]
pub struct PipelineRunner {
    config: PipelineConfig,
}

impl PipelineRunner {
    /// Create a runner for the given configuration.
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Build the command line as a discrete argument vector (first element
    /// is the executable).
    ///
    /// Nothing ever passes through a shell, so metacharacters in any field
    /// stay literal.
    pub fn command_line(&self, invocation: &Invocation) -> Vec<String> {
        let mut command = Vec::with_capacity(8);
        if self.config.use_sudo {
            command.push("sudo".to_string());
        }
        command.push(self.config.executable.display().to_string());
        command.push("-i".to_string());
        command.push(invocation.input_path.display().to_string());
        command.push("-e".to_string());
        command.push(invocation.events.join(","));
        command.push("-o".to_string());
        command.push(invocation.output_path.display().to_string());
        command
    }

    /// Run the pipeline and wait for it to exit.
    ///
    /// Non-zero exit becomes [`RunError::PipelineFailed`] carrying the
    /// captured stderr. The child is killed if the configured timeout
    /// elapses or the caller drops this future.
    pub async fn invoke(&self, invocation: &Invocation) -> Result<InvocationResult> {
        let start = Instant::now();
        let command_line = self.command_line(invocation);
        let exe = &command_line[0];
        let args = &command_line[1..];

        tracing::info!(executable = %exe, ?args, "invoking pipeline");

        let child = Command::new(exe)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RunError::Spawn {
                executable: exe.clone(),
                source,
            })?;

        let output = if self.config.timeout_secs > 0 {
            tokio::time::timeout(
                Duration::from_secs(self.config.timeout_secs),
                child.wait_with_output(),
            )
            .await
            .map_err(|_| RunError::Timeout {
                timeout_secs: self.config.timeout_secs,
            })??
        } else {
            child.wait_with_output().await?
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        let exit_code = output.status.code().unwrap_or(-1);
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            tracing::warn!(exit_code, duration_ms, "pipeline failed");
            return Err(RunError::PipelineFailed {
                exit_code,
                stdout,
                stderr,
            });
        }

        tracing::info!(exit_code, duration_ms, "pipeline finished");

        Ok(InvocationResult {
            exit_code,
            stdout,
            stderr,
            duration_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn invocation() -> Invocation {
        Invocation {
            input_path: PathBuf::from("/corpus/test_1.c"),
            events: vec!["PAPI_L1_DCM".to_string(), "PAPI_TOT_INS".to_string()],
            output_path: PathBuf::from("/out/metrics.csv"),
            artifact_name: "metrics.csv".to_string(),
        }
    }

    fn runner(executable: &str) -> PipelineRunner {
        PipelineRunner::new(PipelineConfig::new("/corpus", "/out", executable))
    }

    #[test]
    fn test_command_line_shape() {
        let command = runner("/opt/perflab/run_pipeline.sh").command_line(&invocation());
        assert_eq!(
            command,
            vec![
                "/opt/perflab/run_pipeline.sh",
                "-i",
                "/corpus/test_1.c",
                "-e",
                "PAPI_L1_DCM,PAPI_TOT_INS",
                "-o",
                "/out/metrics.csv",
            ]
        );
    }

    #[test]
    fn test_command_line_sudo_prefix() {
        let config =
            PipelineConfig::new("/corpus", "/out", "/opt/perflab/run_pipeline.sh").with_sudo();
        let command = PipelineRunner::new(config).command_line(&invocation());
        assert_eq!(command[0], "sudo");
        assert_eq!(command[1], "/opt/perflab/run_pipeline.sh");
    }

    #[test]
    fn test_metacharacters_stay_single_arguments() {
        let mut inv = invocation();
        inv.input_path = PathBuf::from("/corpus/; rm -rf evil");
        let command = runner("/opt/perflab/run_pipeline.sh").command_line(&inv);
        assert_eq!(command[2], "/corpus/; rm -rf evil");
        assert_eq!(command[4], "PAPI_L1_DCM,PAPI_TOT_INS");
        assert_eq!(command.len(), 7);
    }

    #[tokio::test]
    async fn test_invoke_captures_stdout() {
        let result = runner("echo")
            .invoke(&invocation())
            .await
            .expect("invoke failed");
        assert_eq!(result.exit_code, 0);
        assert!(result.stdout.contains("PAPI_L1_DCM,PAPI_TOT_INS"));
    }

    #[tokio::test]
    async fn test_invoke_nonzero_exit_is_failure() {
        let err = runner("false")
            .invoke(&invocation())
            .await
            .expect_err("false should fail");
        match err {
            RunError::PipelineFailed { exit_code, .. } => assert_ne!(exit_code, 0),
            other => panic!("expected PipelineFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invoke_spawn_failure() {
        let err = runner("/nonexistent-binary-that-does-not-exist")
            .invoke(&invocation())
            .await
            .expect_err("spawn should fail");
        assert!(matches!(err, RunError::Spawn { .. }));
    }
}
