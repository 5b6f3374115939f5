//! # pcbench - Parallel CPU Benchmark and System Diagnostics
//!
//! pcbench runs an identical CPU-bound workload on a fixed number of OS
//! threads, times every worker, and repeats the batch as often as requested.
//! It also collects hardware/OS information into an HTML system report.
//!
//! ## Features
//!
//! - **Fan-out/fan-in harness**: one OS thread per worker, results in submission order
//! - **Deterministic workload**: identical results on every run and machine
//! - **Per-iteration timeout**: stalled batches are cancelled and reported
//! - **Report sinks**: console text, JSON, or a timestamped text file
//! - **System report**: CPU, RAM, GPU, OS, usage, disks and disk speed
//!
//! ## Quick Start
//!
//! ```no_run
//! use pcbench::config::BenchmarkConfig;
//! use pcbench::core::BenchmarkRunner;
//! use pcbench::report::TextSink;
//!
//! let config = BenchmarkConfig::new(10_000_000, 4, 3);
//! let mut runner = BenchmarkRunner::new().with_sink(Box::new(TextSink::stdout()));
//!
//! let reports = runner.run(&config).unwrap();
//! println!("Ran {} iterations", reports.len());
//! ```
//!
//! ## System Analysis
//!
//! ```no_run
//! use pcbench::system::SystemInfo;
//!
//! let system_info = SystemInfo::collect();
//! system_info.print_summary();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod core;
pub mod error;
pub mod report;
pub mod system;

// Re-export commonly used types
pub use config::BenchmarkConfig;
pub use core::{BenchmarkRunner, IterationReport, WorkerPool, WorkerResult};
pub use error::{BenchError, Result};
pub use report::ReportSink;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    //! Convenient re-exports for common usage
    //!
    //! ```no_run
    //! use pcbench::prelude::*;
    //! ```

    pub use crate::config::{BenchmarkConfig, ReportOptions};
    pub use crate::core::{
        compute, BenchmarkRunner, IterationReport, IterationRunner, RunState, WorkUnit, WorkerPool,
        WorkerResult, Workload,
    };
    pub use crate::error::{BenchError, Result};
    pub use crate::report::{FileSink, JsonSink, MultiSink, ReportSink, SystemReport, TextSink};
    pub use crate::system::{CapabilityProbe, DiskSpeedTest, SystemInfo, UsageSnapshot};
}
