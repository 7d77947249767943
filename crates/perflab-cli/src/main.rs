//! Perflab - profiling pipeline console CLI
//!
//! The `perflab` command drives the profiling pipeline without the HTTP
//! server.
//!
//! ## Commands
//!
//! - `run`: invoke the pipeline on a corpus file and print the report
//! - `check`: verify the configured roots and executable exist

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::Level;

use perflab_core::{
    init_tracing, MetricsTable, PipelineConfig, RunReport, RunRequest, RunService,
    ARTIFACT_MISSING_MESSAGE, DEFAULT_TIMEOUT_SECS,
};

#[derive(Parser)]
#[command(name = "perflab")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Run the Perflab profiling pipeline from the command line", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Pipeline location flags shared by every subcommand.
#[derive(clap::Args)]
struct PipelineArgs {
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
}

impl PipelineArgs {
    fn into_config(self) -> PipelineConfig {
        let mut config = PipelineConfig::new(self.input_root, self.output_root, self.pipeline_bin)
            .with_upload_dir(self.upload_dir)
            .with_timeout_secs(self.timeout_secs);
        if self.sudo {
            config = config.with_sudo();
        }
        config
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline on a corpus file and print the report
    Run {
        /// Source file name, relative to the input root
        #[arg(short, long)]
        file: String,

        /// Comma-separated PAPI event names
        #[arg(short, long)]
        events: String,

        /// Artifact file name (default: timestamped)
        #[arg(short, long)]
        output: Option<String>,

        /// Print the report as JSON instead of text
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Verify the configured roots and pipeline executable exist
    Check {
        #[command(flatten)]
        pipeline: PipelineArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json_logs, level);

    match cli.command {
        Commands::Run {
            file,
            events,
            output,
            json,
            pipeline,
        } => cmd_run(pipeline.into_config(), file, events, output, json).await,
        Commands::Check { pipeline } => cmd_check(&pipeline.into_config()),
    }
}

async fn cmd_run(
    config: PipelineConfig,
    file: String,
    events: String,
    output: Option<String>,
    json: bool,
) -> Result<()> {
    let mut request = RunRequest::new(file, RunRequest::parse_events(&events));
    if let Some(output) = output {
        request = request.with_output_file(output);
    }

    let service = RunService::new(config);
    let report = service.run(&request).await.context("pipeline run failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report.to_json())?);
    } else {
        print_text_report(&report);
    }
    Ok(())
}

fn print_text_report(report: &RunReport) {
    if !report.stdout.is_empty() {
        println!("--- pipeline output ---");
        print!("{}", report.stdout);
        if !report.stdout.ends_with('\n') {
            println!();
        }
    }
    match &report.table {
        Some(table) => {
            println!("--- {} ---", report.artifact_name);
            print!("{}", format_table(table));
        }
        None => println!("{ARTIFACT_MISSING_MESSAGE}"),
    }
}

/// Align the metrics table into fixed-width text columns.
fn format_table(table: &MetricsTable) -> String {
    let mut widths: Vec<usize> = table.columns.iter().map(String::len).collect();
    for row in &table.rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.len());
            }
        }
    }

    let render_row = |cells: &[String]| -> String {
        let formatted: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect();
        format!("{}\n", formatted.join("  ").trim_end())
    };

    let mut out = render_row(&table.columns);
    for row in &table.rows {
        out.push_str(&render_row(row));
    }
    out
}

fn cmd_check(config: &PipelineConfig) -> Result<()> {
    let mut problems = Vec::new();

    check_dir("input root", &config.input_root, &mut problems);
    check_dir("output root", &config.output_root, &mut problems);

    // Bare names resolve via PATH at spawn time and cannot be checked here.
    if !config.executable.is_absolute() && config.executable.components().count() == 1 {
        println!(
            "skip: pipeline executable {} resolves via PATH",
            config.executable.display()
        );
    } else if config.executable.is_file() {
        println!("ok: pipeline executable {}", config.executable.display());
    } else {
        problems.push(format!(
            "pipeline executable not found: {}",
            config.executable.display()
        ));
    }

    for problem in &problems {
        eprintln!("problem: {problem}");
    }
    if !problems.is_empty() {
        bail!("{} problem(s) found", problems.len());
    }
    println!("environment ok");
    Ok(())
}

fn check_dir(label: &str, path: &Path, problems: &mut Vec<String>) {
    if path.is_dir() {
        println!("ok: {label} {}", path.display());
    } else {
        problems.push(format!("{label} {} is not a directory", path.display()));
    }
}
