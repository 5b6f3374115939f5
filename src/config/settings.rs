//! Configuration settings for pcbench
//!
//! Defines the CLI arguments, the benchmark configuration and its
//! validation, and the options controlling where reports go.

use crate::error::{BenchError, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default number of workload iterations each worker performs
pub const DEFAULT_ITERATIONS_PER_WORKER: u64 = 100_000_000;

/// Default number of benchmark repetitions
pub const DEFAULT_REPEAT_COUNT: usize = 1;

/// Default size of the disk speed test file
pub const DEFAULT_DISK_TEST_SIZE: &str = "100M";

/// pcbench - parallel CPU benchmark and system diagnostics
#[derive(Parser, Debug, Clone)]
#[command(name = "pcbench")]
#[command(author = "pcbench Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Parallel CPU benchmark and system diagnostics")]
#[command(long_about = r#"
pcbench runs an identical CPU-bound workload on a fixed number of OS threads,
times every worker, and repeats the batch as many times as requested.

Examples:
  pcbench                                   # One iteration, one worker per CPU
  pcbench -w 8 -n 10000000 -r 5             # 8 workers, 5 repetitions
  pcbench --save --snapshot                 # Also write pc<host>_threads_<ts>.txt
  pcbench --timeout 2m                      # Abort an iteration after 2 minutes
  pcbench report                            # HTML system report
  pcbench analyze                           # System summary on the console
"#)]
pub struct CliArgs {
    /// Workload iterations performed by each worker
    #[arg(short = 'n', long, default_value_t = DEFAULT_ITERATIONS_PER_WORKER, value_name = "NUM")]
    pub iterations: u64,

    /// Number of parallel workers (0 = one per logical CPU)
    #[arg(short = 'w', long, default_value = "0", value_name = "NUM")]
    pub workers: usize,

    /// Number of times the whole batch is repeated
    #[arg(short = 'r', long, default_value_t = DEFAULT_REPEAT_COUNT, value_name = "NUM")]
    pub repeat: usize,

    /// Per-iteration timeout (e.g. 30s, 5m)
    #[arg(long, value_parser = humantime::parse_duration, value_name = "DURATION")]
    pub timeout: Option<Duration>,

    /// Save the results to pc<host>_threads_<timestamp>.txt
    #[arg(short = 's', long)]
    pub save: bool,

    /// Directory for saved reports
    #[arg(short = 'o', long, default_value = ".", value_name = "DIR")]
    pub output_dir: PathBuf,

    /// Include a hardware usage snapshot in the saved report
    #[arg(long)]
    pub snapshot: bool,

    /// Console output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress console results)
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Write an HTML system report (hardware, OS, usage, disk speed)
    #[command(name = "report")]
    Report {
        /// Directory for the report file
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
        /// Skip the disk write/read speed test
        #[arg(long)]
        skip_disk_test: bool,
        /// Size of the disk speed test file (e.g. 100M, 1G)
        #[arg(long, default_value = DEFAULT_DISK_TEST_SIZE)]
        disk_test_size: String,
    },

    /// Print a system summary to the console
    #[command(name = "analyze")]
    Analyze,
}

/// Output format for benchmark results
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON document
    Json,
}

/// Parameters of one benchmark run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    /// Workload iterations performed by each worker
    pub iteration_count_per_worker: u64,
    /// Number of workers in every batch
    pub worker_count: usize,
    /// Number of sequential iterations
    pub iteration_repeat_count: usize,
    /// Abort an iteration that takes longer than this
    pub iteration_timeout: Option<Duration>,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            iteration_count_per_worker: DEFAULT_ITERATIONS_PER_WORKER,
            worker_count: num_cpus::get(),
            iteration_repeat_count: DEFAULT_REPEAT_COUNT,
            iteration_timeout: None,
        }
    }
}

impl BenchmarkConfig {
    /// Create a config without a timeout
    pub fn new(iteration_count_per_worker: u64, worker_count: usize, iteration_repeat_count: usize) -> Self {
        Self {
            iteration_count_per_worker,
            worker_count,
            iteration_repeat_count,
            iteration_timeout: None,
        }
    }

    /// Set the per-iteration timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.iteration_timeout = Some(timeout);
        self
    }

    /// Create config from CLI arguments
    pub fn from_cli(args: &CliArgs) -> Result<Self> {
        let worker_count = if args.workers == 0 {
            num_cpus::get()
        } else {
            args.workers
        };

        let config = Self {
            iteration_count_per_worker: args.iterations,
            worker_count,
            iteration_repeat_count: args.repeat,
            iteration_timeout: args.timeout,
        };

        config.validate()?;
        Ok(config)
    }

    /// Check the invariants every run relies on.
    ///
    /// A zero iteration count is allowed: it yields an empty workload and
    /// near-zero timings, which is a useful overhead measurement.
    pub fn validate(&self) -> Result<()> {
        if self.worker_count == 0 {
            return Err(BenchError::config("worker_count must be positive"));
        }
        if self.iteration_repeat_count == 0 {
            return Err(BenchError::config("iteration_repeat_count must be positive"));
        }
        if self.iteration_timeout == Some(Duration::ZERO) {
            return Err(BenchError::config("iteration timeout must be greater than zero"));
        }
        Ok(())
    }
}

/// Where and how benchmark results are reported
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Console output format
    pub format: OutputFormat,
    /// Suppress console results
    pub quiet: bool,
    /// Write a text report file
    pub save: bool,
    /// Directory for the report file
    pub output_dir: PathBuf,
    /// Include a hardware usage snapshot in the report file
    pub snapshot: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            quiet: false,
            save: false,
            output_dir: PathBuf::from("."),
            snapshot: false,
        }
    }
}

impl ReportOptions {
    /// Create report options from CLI arguments
    pub fn from_cli(args: &CliArgs) -> Self {
        Self {
            format: args.format,
            quiet: args.quiet,
            save: args.save,
            output_dir: args.output_dir.clone(),
            snapshot: args.snapshot,
        }
    }
}

/// Parse human-readable size string to bytes
pub fn parse_size(size: &str) -> std::result::Result<u64, String> {
    let size = size.trim().to_uppercase();

    if size.is_empty() {
        return Err("Empty size string".to_string());
    }

    let (num_str, multiplier) = if size.ends_with("GB") || size.ends_with('G') {
        (size.trim_end_matches(['G', 'B']), 1024u64 * 1024 * 1024)
    } else if size.ends_with("MB") || size.ends_with('M') {
        (size.trim_end_matches(['M', 'B']), 1024u64 * 1024)
    } else if size.ends_with("KB") || size.ends_with('K') {
        (size.trim_end_matches(['K', 'B']), 1024u64)
    } else {
        (size.trim_end_matches('B'), 1u64)
    };

    let num: f64 = num_str
        .trim()
        .parse()
        .map_err(|_| format!("Invalid number: {}", num_str))?;

    if num < 0.0 {
        return Err(format!("Negative size: {}", size));
    }

    Ok((num * multiplier as f64) as u64)
}
