//! End-to-end run flow tests against stub pipeline scripts.

use perflab_core::{PipelineConfig, RunError, RunRequest, RunService};
use std::fs;
use std::os::unix::fs::PermissionsExt as _;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Write an executable stub pipeline script into `dir`.
fn write_stub(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("run_pipeline.sh");
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write stub");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod stub");
    path
}

/// Config with corpus/out/spool directories under one tempdir and the
/// given stub as the pipeline. Stubs see `-i IN -e EVENTS -o OUT`, so
/// `$6` is the artifact path.
fn stub_config(root: &TempDir, stub_body: &str) -> PipelineConfig {
    let input_root = root.path().join("corpus");
    let output_root = root.path().join("out");
    fs::create_dir_all(&input_root).expect("create corpus");
    fs::create_dir_all(&output_root).expect("create out");
    let script = write_stub(root.path(), stub_body);
    PipelineConfig::new(input_root, output_root, script)
        .with_upload_dir(root.path().join("spool"))
        .with_timeout_secs(10)
}

fn request() -> RunRequest {
    RunRequest::new("test_1.c", vec!["PAPI_TOT_INS".to_string()])
        .with_output_file("function_metrics.csv")
}

/// Test: exit 0 + CSV artifact renders stdout and an ordered table.
#[tokio::test]
async fn test_run_renders_metrics_table() {
    let root = TempDir::new().expect("tempdir");
    let config = stub_config(
        &root,
        r#"printf 'name,calls\nfoo,3\n' > "$6"
echo "pipeline done""#,
    );
    fs::write(
        config.input_root.join("test_1.c"),
        "int main(void) { return 0; }\n",
    )
    .expect("write corpus file");

    let report = RunService::new(config)
        .run(&request())
        .await
        .expect("run failed");

    assert!(report.stdout.contains("pipeline done"));
    let table = report.table.as_ref().expect("table should be present");
    assert_eq!(table.columns, vec!["name", "calls"]);
    assert_eq!(table.rows, vec![vec!["foo", "3"]]);

    let html = report.to_html();
    assert!(html.contains("<tr><th>name</th><th>calls</th></tr>"));
    assert!(html.contains("<tr><td>foo</td><td>3</td></tr>"));
}

/// Test: non-zero exit surfaces stderr verbatim and never parses CSV.
#[tokio::test]
async fn test_failing_pipeline_surfaces_stderr() {
    let root = TempDir::new().expect("tempdir");
    let config = stub_config(
        &root,
        r#"echo boom >&2
exit 1"#,
    );

    let err = RunService::new(config)
        .run(&request())
        .await
        .expect_err("run should fail");

    match err {
        RunError::PipelineFailed {
            exit_code, stderr, ..
        } => {
            assert_eq!(exit_code, 1);
            assert!(stderr.contains("boom"));
        }
        other => panic!("expected PipelineFailed, got {other:?}"),
    }
}

/// Test: exit 0 without an artifact keeps stdout and flags the gap.
#[tokio::test]
async fn test_clean_exit_without_artifact_keeps_stdout() {
    let root = TempDir::new().expect("tempdir");
    let config = stub_config(&root, r#"echo "ran fine""#);

    let report = RunService::new(config)
        .run(&request())
        .await
        .expect("run failed");

    assert!(report.table.is_none());
    let html = report.to_html();
    assert!(html.contains("ran fine"));
    assert!(html.contains("Script ran, but CSV not found."));
}

/// Test: a pipeline that outruns its wall-clock limit is killed and
/// reported as a timeout, not a hang.
#[tokio::test]
async fn test_timeout_kills_pipeline() {
    let root = TempDir::new().expect("tempdir");
    let config = stub_config(&root, "sleep 5").with_timeout_secs(1);

    let err = RunService::new(config)
        .run(&request())
        .await
        .expect_err("run should time out");

    assert!(matches!(err, RunError::Timeout { timeout_secs: 1 }));
}

/// Test: traversal is rejected before anything is spawned.
#[tokio::test]
async fn test_traversal_is_rejected_before_spawn() {
    let root = TempDir::new().expect("tempdir");
    let config = stub_config(&root, r#"touch "$(dirname "$0")/spawned""#);
    let marker = root.path().join("spawned");

    let bad = RunRequest::new("../../etc/passwd", vec!["PAPI_TOT_INS".to_string()]);
    let err = RunService::new(config)
        .run(&bad)
        .await
        .expect_err("should reject");

    assert!(matches!(err, RunError::InvalidInput(_)));
    assert!(!marker.exists(), "pipeline must not have been spawned");
}

/// Test: empty event list is rejected before anything is spawned.
#[tokio::test]
async fn test_empty_events_rejected_before_spawn() {
    let root = TempDir::new().expect("tempdir");
    let config = stub_config(&root, r#"touch "$(dirname "$0")/spawned""#);
    let marker = root.path().join("spawned");

    let bad = RunRequest::new("test_1.c", RunRequest::parse_events(" , ,"));
    let err = RunService::new(config)
        .run(&bad)
        .await
        .expect_err("should reject");

    assert!(matches!(err, RunError::InvalidInput(_)));
    assert!(!marker.exists(), "pipeline must not have been spawned");
}

/// Test: every field reaches the pipeline as one literal argument; shell
/// metacharacters never alter the executed command.
#[tokio::test]
async fn test_fields_stay_literal_arguments() {
    let root = TempDir::new().expect("tempdir");
    let config = stub_config(&root, r#"printf '%s\n' "$@" > "$(dirname "$0")/argv.txt""#);

    let request = RunRequest::new(
        "; rm -rf evil",
        RunRequest::parse_events("PAPI_L1_DCM,PAPI_TOT_INS"),
    )
    .with_output_file("function_metrics.csv");

    RunService::new(config)
        .run(&request)
        .await
        .expect("run failed");

    let argv = fs::read_to_string(root.path().join("argv.txt")).expect("read argv");
    let args: Vec<&str> = argv.lines().collect();
    assert_eq!(args.len(), 6, "expected 6 literal arguments, got {args:?}");
    assert_eq!(args[0], "-i");
    assert!(args[1].ends_with("; rm -rf evil"));
    assert_eq!(args[2], "-e");
    assert_eq!(args[3], "PAPI_L1_DCM,PAPI_TOT_INS");
    assert_eq!(args[4], "-o");
    assert!(args[5].ends_with("function_metrics.csv"));
}

/// Test: identical requests against identical pipeline output render
/// byte-identically.
#[tokio::test]
async fn test_identical_runs_render_identically() {
    let root = TempDir::new().expect("tempdir");
    let config = stub_config(
        &root,
        r#"printf 'name,calls\nfoo,3\n' > "$6"
echo "pipeline done""#,
    );
    let service = RunService::new(config);

    let first = service.run(&request()).await.expect("first run failed");
    let second = service.run(&request()).await.expect("second run failed");

    assert_eq!(first.to_html(), second.to_html());
    assert_eq!(first.to_json(), second.to_json());
}

/// Test: an uneven CSV is reported as malformed, with no partial table.
#[tokio::test]
async fn test_malformed_artifact_is_an_error() {
    let root = TempDir::new().expect("tempdir");
    let config = stub_config(&root, r#"printf 'name,calls\nfoo,3,99\n' > "$6""#);

    let err = RunService::new(config)
        .run(&request())
        .await
        .expect_err("run should fail");

    assert!(matches!(err, RunError::MalformedArtifact { .. }));
}
