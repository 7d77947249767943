//! perflabd - Perflab HTTP daemon.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::Level;

use perflab_core::{init_tracing, PipelineConfig, DEFAULT_TIMEOUT_SECS};
use perflab_server::{serve, ServerConfig};

/// HTTP server for the Perflab profiling pipeline.
#[derive(Parser)]
#[command(name = "perflabd")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "HTTP server for the Perflab profiling pipeline", long_about = None)]
struct Args {
    /// TCP port to listen on
    #[arg(long, env = "PERFLAB_PORT", default_value_t = 3000)]
    port: u16,

    /// Directory holding the test corpus source files
    #[arg(long, env = "PERFLAB_INPUT_ROOT", default_value = "test")]
    input_root: PathBuf,

    /// Directory the pipeline writes CSV artifacts into
    #[arg(long, env = "PERFLAB_OUTPUT_ROOT", default_value = ".")]
    output_root: PathBuf,

    /// Pipeline executable invoked once per run
    #[arg(long, env = "PERFLAB_PIPELINE_BIN", default_value = "./run_pipeline.sh")]
    pipeline_bin: PathBuf,

    /// Directory uploads are spooled into
    #[arg(long, env = "PERFLAB_UPLOAD_DIR", default_value = "uploads")]
    upload_dir: PathBuf,

    /// Per-invocation timeout in seconds (0 disables the timeout)
    #[arg(long, env = "PERFLAB_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Run the pipeline under sudo
    #[arg(long, env = "PERFLAB_SUDO")]
    sudo: bool,

    /// Largest accepted upload body in bytes
    #[arg(long, env = "PERFLAB_MAX_UPLOAD_BYTES", default_value_t = 8 * 1024 * 1024)]
    max_upload_bytes: usize,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    init_tracing(args.json, level);

    let mut pipeline = PipelineConfig::new(args.input_root, args.output_root, args.pipeline_bin)
        .with_upload_dir(args.upload_dir)
        .with_timeout_secs(args.timeout_secs);
    if args.sudo {
        pipeline = pipeline.with_sudo();
    }

    let config = ServerConfig::new(pipeline)
        .with_port(args.port)
        .with_max_upload_bytes(args.max_upload_bytes);

    serve(config).await
}
