//! Report sinks
//!
//! The benchmark runner hands every sealed iteration to a [`ReportSink`];
//! sinks decide how results are presented (console text, file, JSON).

use crate::config::BenchmarkConfig;
use crate::core::{IterationReport, WorkerResult};
use crate::error::{IoResultExt, Result};
use std::io::Write;

/// Destination for benchmark results
pub trait ReportSink {
    /// Called once before the first iteration is dispatched
    fn begin(&mut self, config: &BenchmarkConfig) -> Result<()>;

    /// Called after each iteration's fan-in barrier completes
    fn iteration(&mut self, report: &IterationReport) -> Result<()>;

    /// Called once after the last iteration succeeded
    fn finish(&mut self, reports: &[IterationReport]) -> Result<()>;
}

/// Per-worker result line
pub fn format_worker_line(result: &WorkerResult) -> String {
    format!(
        "Process {} finished in {:.4} seconds. Result: {}",
        result.worker, result.elapsed_seconds, result.computed_value
    )
}

/// Per-iteration total line
pub fn format_total_line(report: &IterationReport) -> String {
    format!(
        "Total time for iteration {}: {:.2} seconds",
        report.iteration_index, report.total_elapsed_seconds
    )
}

/// Banner printed before the run starts
pub fn format_banner(config: &BenchmarkConfig) -> String {
    format!(
        "Running benchmark with {} parallel workers, each with {} iterations...",
        config.worker_count, config.iteration_count_per_worker
    )
}

/// Write the lines of one iteration
pub(crate) fn write_iteration<W: Write>(out: &mut W, report: &IterationReport) -> std::io::Result<()> {
    for result in &report.results {
        writeln!(out, "{}", format_worker_line(result))?;
    }
    writeln!(out, "{}", format_total_line(report))?;
    writeln!(out)
}

/// Plain text sink writing to any writer (stdout by default)
pub struct TextSink<W: Write> {
    out: W,
}

impl TextSink<std::io::Stdout> {
    /// Text sink on standard output
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> TextSink<W> {
    /// Text sink on `out`
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Consume the sink and return the writer
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for TextSink<W> {
    fn begin(&mut self, config: &BenchmarkConfig) -> Result<()> {
        writeln!(self.out, "{}\n", format_banner(config)).with_path("<console>")
    }

    fn iteration(&mut self, report: &IterationReport) -> Result<()> {
        write_iteration(&mut self.out, report).with_path("<console>")?;
        self.out.flush().with_path("<console>")
    }

    fn finish(&mut self, _reports: &[IterationReport]) -> Result<()> {
        self.out.flush().with_path("<console>")
    }
}

/// Forwards every call to several sinks in order
#[derive(Default)]
pub struct MultiSink {
    sinks: Vec<Box<dyn ReportSink>>,
}

impl MultiSink {
    /// Create an empty fan-out sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sink
    pub fn push(&mut self, sink: Box<dyn ReportSink>) {
        self.sinks.push(sink);
    }

    /// Number of attached sinks
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Check if no sink is attached
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl ReportSink for MultiSink {
    fn begin(&mut self, config: &BenchmarkConfig) -> Result<()> {
        self.sinks.iter_mut().try_for_each(|s| s.begin(config))
    }

    fn iteration(&mut self, report: &IterationReport) -> Result<()> {
        self.sinks.iter_mut().try_for_each(|s| s.iteration(report))
    }

    fn finish(&mut self, reports: &[IterationReport]) -> Result<()> {
        self.sinks.iter_mut().try_for_each(|s| s.finish(reports))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::WorkerIdentity;

    pub(crate) fn sample_report(iteration_index: usize) -> IterationReport {
        let results = (0..2)
            .map(|slot| WorkerResult {
                worker: WorkerIdentity {
                    slot,
                    process_id: 100,
                    thread_name: format!("bench-worker-{}", slot),
                    thread_id: format!("ThreadId({})", slot + 2),
                },
                elapsed_seconds: 1.23456,
                computed_value: 2993,
            })
            .collect();

        IterationReport {
            iteration_index,
            results,
            total_elapsed_seconds: 1.5,
        }
    }

    #[test]
    fn test_line_formats() {
        let report = sample_report(3);

        assert_eq!(
            format_worker_line(&report.results[0]),
            "Process 100/bench-worker-0 finished in 1.2346 seconds. Result: 2993"
        );
        assert_eq!(format_total_line(&report), "Total time for iteration 3: 1.50 seconds");
    }

    #[test]
    fn test_text_sink_output() {
        let config = BenchmarkConfig::new(1000, 2, 1);
        let mut sink = TextSink::new(Vec::new());

        sink.begin(&config).unwrap();
        sink.iteration(&sample_report(1)).unwrap();
        sink.finish(&[sample_report(1)]).unwrap();

        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "Running benchmark with 2 parallel workers, each with 1000 iterations..."
        );
        assert!(lines[2].starts_with("Process 100/bench-worker-0"));
        assert!(lines[3].starts_with("Process 100/bench-worker-1"));
        assert_eq!(lines[4], "Total time for iteration 1: 1.50 seconds");
    }

    #[test]
    fn test_multi_sink_forwards() {
        let mut multi = MultiSink::new();
        assert!(multi.is_empty());
        multi.push(Box::new(TextSink::new(Vec::new())));
        multi.push(Box::new(TextSink::new(Vec::new())));
        assert_eq!(multi.len(), 2);

        let config = BenchmarkConfig::new(10, 2, 1);
        multi.begin(&config).unwrap();
        multi.iteration(&sample_report(1)).unwrap();
        multi.finish(&[sample_report(1)]).unwrap();
    }
}
