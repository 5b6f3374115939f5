//! Error types for pcbench
//!
//! This module defines all error types used throughout the toolkit,
//! carrying enough context (iteration, worker, path) to diagnose a failed run.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Main error type for pcbench operations
#[derive(Error, Debug)]
pub enum BenchError {
    /// Invalid benchmark configuration, detected before any work is dispatched
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A worker failed or was terminated abnormally during a batch
    #[error("Worker {} failed during iteration {iteration}: {message}", worker_label(.worker))]
    WorkerExecution {
        /// 1-based iteration that failed
        iteration: usize,
        /// Worker that failed, when known
        worker: Option<String>,
        /// Failure description
        message: String,
    },

    /// A batch did not complete within the per-iteration timeout
    #[error("Iteration {iteration} timed out after {}", format_timeout(.timeout))]
    WorkerTimeout {
        /// 1-based iteration that stalled
        iteration: usize,
        /// Configured limit
        timeout: Duration,
    },

    /// The report file could not be created or written
    #[error("Failed to write report '{path}': {source}")]
    ReportWrite {
        /// Path being accessed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// I/O error with path context
    #[error("I/O error at '{path}': {source}")]
    Io {
        /// Path being accessed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Report serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl BenchError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a worker execution error
    pub fn worker(iteration: usize, worker: Option<String>, message: impl Into<String>) -> Self {
        Self::WorkerExecution {
            iteration,
            worker,
            message: message.into(),
        }
    }

    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a report write error
    pub fn report_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReportWrite {
            path: path.into(),
            source,
        }
    }

    /// Iteration the error happened in, if it came from the harness
    pub fn iteration(&self) -> Option<usize> {
        match self {
            Self::WorkerExecution { iteration, .. } | Self::WorkerTimeout { iteration, .. } => {
                Some(*iteration)
            }
            _ => None,
        }
    }

    /// Get the path associated with this error, if any
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::ReportWrite { path, .. } | Self::Io { path, .. } => Some(path),
            _ => None,
        }
    }
}

fn worker_label(worker: &Option<String>) -> &str {
    worker.as_deref().unwrap_or("<unknown>")
}

fn format_timeout(timeout: &Duration) -> humantime::FormattedDuration {
    humantime::format_duration(*timeout)
}

/// Result type alias for pcbench operations
pub type Result<T> = std::result::Result<T, BenchError>;

impl From<std::io::Error> for BenchError {
    fn from(err: std::io::Error) -> Self {
        BenchError::Io {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for BenchError {
    fn from(err: serde_json::Error) -> Self {
        BenchError::Serialization(err.to_string())
    }
}

/// Extension trait for adding path context to std::io::Result
pub trait IoResultExt<T> {
    /// Add path context to an I/O error
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;

    /// Mark an I/O error as a report write failure for `path`
    fn report_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| BenchError::io(path, e))
    }

    fn report_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| BenchError::report_write(path, e))
    }
}
