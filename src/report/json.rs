//! JSON rendering of a complete run

use crate::config::BenchmarkConfig;
use crate::core::IterationReport;
use crate::error::{IoResultExt, Result};
use crate::report::sink::ReportSink;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::io::Write;

/// Serialized form of a finished run
#[derive(Debug, Serialize)]
pub struct RunDocument<'a> {
    /// Host the benchmark ran on
    pub host: String,
    /// Generation timestamp
    pub generated: DateTime<Local>,
    /// Workload iterations per worker
    pub iteration_count_per_worker: u64,
    /// Workers per batch
    pub worker_count: usize,
    /// Per-iteration results
    pub iterations: &'a [IterationReport],
}

/// Sink writing one JSON document once the run completes
pub struct JsonSink<W: Write> {
    out: W,
    host: String,
    config: Option<BenchmarkConfig>,
}

impl JsonSink<std::io::Stdout> {
    /// JSON sink on standard output
    pub fn stdout() -> Self {
        Self::new(std::io::stdout(), crate::report::host_name())
    }
}

impl<W: Write> JsonSink<W> {
    /// JSON sink on `out`
    pub fn new(out: W, host: impl Into<String>) -> Self {
        Self {
            out,
            host: host.into(),
            config: None,
        }
    }

    /// Consume the sink and return the writer
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for JsonSink<W> {
    fn begin(&mut self, config: &BenchmarkConfig) -> Result<()> {
        self.config = Some(config.clone());
        Ok(())
    }

    fn iteration(&mut self, _report: &IterationReport) -> Result<()> {
        Ok(())
    }

    fn finish(&mut self, reports: &[IterationReport]) -> Result<()> {
        let config = self.config.take().unwrap_or_default();
        let document = RunDocument {
            host: self.host.clone(),
            generated: Local::now(),
            iteration_count_per_worker: config.iteration_count_per_worker,
            worker_count: config.worker_count,
            iterations: reports,
        };

        serde_json::to_writer_pretty(&mut self.out, &document)?;
        writeln!(self.out).with_path("<console>")?;
        self.out.flush().with_path("<console>")
    }
}
