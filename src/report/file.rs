//! Timestamped text report file

use crate::config::BenchmarkConfig;
use crate::core::IterationReport;
use crate::error::{IoResultExt, Result};
use crate::report::sink::{format_banner, write_iteration, ReportSink};
use chrono::{DateTime, Local};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Host name of this machine, or "localhost" when it cannot be read
pub fn host_name() -> String {
    hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "localhost".to_string())
}

/// File name for a benchmark report: `pc<host>_threads_<YYYYMMDD_HHMMSS>.txt`
pub fn report_file_name(host: &str, generated: &DateTime<Local>) -> String {
    format!("pc{}_threads_{}.txt", host, generated.format("%Y%m%d_%H%M%S"))
}

/// Sink writing a text report to `<dir>/pc<host>_threads_<timestamp>.txt`
pub struct FileSink {
    path: PathBuf,
    host: String,
    generated: DateTime<Local>,
    snapshot: Option<String>,
    writer: Option<BufWriter<File>>,
}

impl FileSink {
    /// Report in `dir` for this host, stamped with the current time
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self::with_host(dir, host_name(), Local::now())
    }

    /// Report in `dir` for an explicit host and generation time
    pub fn with_host(dir: impl AsRef<Path>, host: impl Into<String>, generated: DateTime<Local>) -> Self {
        let host = host.into();
        let path = dir.as_ref().join(report_file_name(&host, &generated));
        Self {
            path,
            host,
            generated,
            snapshot: None,
            writer: None,
        }
    }

    /// Include a hardware usage section in the header
    pub fn with_snapshot(mut self, snapshot: Option<String>) -> Self {
        self.snapshot = snapshot;
        self
    }

    /// Path of the report file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn writer(&mut self) -> Result<&mut BufWriter<File>> {
        let writer = match self.writer.take() {
            Some(writer) => writer,
            None => BufWriter::new(File::create(&self.path).report_path(&self.path)?),
        };
        Ok(self.writer.insert(writer))
    }
}

impl ReportSink for FileSink {
    fn begin(&mut self, config: &BenchmarkConfig) -> Result<()> {
        let path = self.path.clone();
        let header = format!(
            "Benchmark report for {}\nGenerated on: {}\n",
            self.host,
            self.generated.format("%Y-%m-%d %H:%M:%S")
        );
        let snapshot = self.snapshot.clone();
        let out = self.writer()?;

        writeln!(out, "{}", header).report_path(&path)?;
        if let Some(snapshot) = snapshot {
            writeln!(out, "=== Hardware Usage ===\n{}\n", snapshot.trim_end()).report_path(&path)?;
        }
        writeln!(out, "{}\n", format_banner(config)).report_path(&path)
    }

    fn iteration(&mut self, report: &IterationReport) -> Result<()> {
        let path = self.path.clone();
        let out = self.writer()?;
        write_iteration(out, report).report_path(&path)?;
        out.flush().report_path(&path)
    }

    fn finish(&mut self, _reports: &[IterationReport]) -> Result<()> {
        let path = self.path.clone();
        self.writer()?.flush().report_path(&path)?;
        tracing::info!("Report written to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BenchError;
    use crate::report::sink::tests::sample_report;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
    }

    #[test]
    fn test_report_file_name() {
        assert_eq!(
            report_file_name("lab01", &fixed_time()),
            "pclab01_threads_20240309_140507.txt"
        );
    }

    #[test]
    fn test_file_sink_contents() {
        let dir = TempDir::new().unwrap();
        let mut sink = FileSink::with_host(dir.path(), "lab01", fixed_time())
            .with_snapshot(Some("Total CPU Usage: 12.5%".to_string()));
        let config = BenchmarkConfig::new(1000, 2, 2);

        sink.begin(&config).unwrap();
        sink.iteration(&sample_report(1)).unwrap();
        sink.iteration(&sample_report(2)).unwrap();
        sink.finish(&[]).unwrap();

        let path = dir.path().join("pclab01_threads_20240309_140507.txt");
        assert_eq!(sink.path(), path.as_path());

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Benchmark report for lab01\nGenerated on: 2024-03-09 14:05:07\n"));
        assert!(text.contains("=== Hardware Usage ===\nTotal CPU Usage: 12.5%"));
        assert!(text.contains("Total time for iteration 1: 1.50 seconds"));
        assert!(text.contains("Total time for iteration 2: 1.50 seconds"));
        assert_eq!(text.matches("Process 100/bench-worker-").count(), 4);
    }

    #[test]
    fn test_unwritable_directory_reports_path() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("does-not-exist");
        let mut sink = FileSink::with_host(&missing, "lab01", fixed_time());

        let err = sink.begin(&BenchmarkConfig::new(1, 1, 1)).unwrap_err();
        match err {
            BenchError::ReportWrite { path, .. } => assert!(path.starts_with(&missing)),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
