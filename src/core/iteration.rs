//! One benchmark iteration: build a batch, run it, time the whole fan-in

use crate::config::BenchmarkConfig;
use crate::core::pool::{WorkerPool, WorkerResult};
use crate::core::workload::WorkUnit;
use crate::error::Result;
use serde::Serialize;
use std::time::Instant;

/// Results of one fan-out/fan-in cycle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IterationReport {
    /// 1-based iteration number
    pub iteration_index: usize,
    /// One result per worker, in submission order
    pub results: Vec<WorkerResult>,
    /// Wall-clock time from dispatch until the last result arrived
    pub total_elapsed_seconds: f64,
}

impl IterationReport {
    /// Slowest worker's elapsed time
    pub fn slowest_worker_seconds(&self) -> f64 {
        self.results
            .iter()
            .map(|r| r.elapsed_seconds)
            .fold(0.0, f64::max)
    }
}

/// Runs single iterations on a worker pool
#[derive(Debug, Clone, Default)]
pub struct IterationRunner {
    pool: WorkerPool,
}

impl IterationRunner {
    /// Create an iteration runner on top of `pool`
    pub fn new(pool: WorkerPool) -> Self {
        Self { pool }
    }

    /// The pool used for every batch
    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Build `worker_count` identical units and block until all complete.
    ///
    /// Pool failures are returned unchanged.
    pub fn run_iteration(&self, config: &BenchmarkConfig, iteration_index: usize) -> Result<IterationReport> {
        let units: Vec<WorkUnit> = (0..config.worker_count)
            .map(|slot| WorkUnit::new(slot, config.iteration_count_per_worker))
            .collect();

        let start = Instant::now();
        let results = self.pool.submit(&units, iteration_index)?;
        let total_elapsed_seconds = start.elapsed().as_secs_f64();

        tracing::info!(
            "Iteration {} completed: {} workers in {:.2}s",
            iteration_index,
            results.len(),
            total_elapsed_seconds
        );

        Ok(IterationReport {
            iteration_index,
            results,
            total_elapsed_seconds,
        })
    }
}
