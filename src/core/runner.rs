//! Benchmark runner
//!
//! Drives `iteration_repeat_count` strictly sequential iterations. Iteration
//! `k + 1` is not built until iteration `k` has fully completed; the first
//! failure aborts the run. Each sealed report is handed to the attached
//! sink before the next iteration starts.

use crate::config::BenchmarkConfig;
use crate::core::iteration::{IterationReport, IterationRunner};
use crate::core::pool::WorkerPool;
use crate::error::Result;
use crate::report::ReportSink;

/// Lifecycle of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Not started
    Idle,
    /// Executing iteration `iteration` of `of` (1-based)
    Running {
        /// Current iteration
        iteration: usize,
        /// Total iterations
        of: usize,
    },
    /// All iterations succeeded
    Completed,
    /// The run was aborted; `iteration` is where it failed (0 = before dispatch)
    Failed {
        /// Failing iteration
        iteration: usize,
    },
}

/// Runs complete benchmarks
pub struct BenchmarkRunner {
    iterations: IterationRunner,
    sink: Option<Box<dyn ReportSink>>,
    state: RunState,
}

impl Default for BenchmarkRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl BenchmarkRunner {
    /// Create a runner using the CPU stress workload and no sink
    pub fn new() -> Self {
        Self::with_pool(WorkerPool::new())
    }

    /// Create a runner on a custom pool
    pub fn with_pool(pool: WorkerPool) -> Self {
        Self {
            iterations: IterationRunner::new(pool),
            sink: None,
            state: RunState::Idle,
        }
    }

    /// Attach a report sink
    pub fn with_sink(mut self, sink: Box<dyn ReportSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Current run state
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Run every iteration of `config` and return the reports in order.
    ///
    /// The timeout in `config` overrides the pool's own timeout for this run
    /// only.
    pub fn run(&mut self, config: &BenchmarkConfig) -> Result<Vec<IterationReport>> {
        if let Err(e) = config.validate() {
            self.transition(RunState::Failed { iteration: 0 });
            return Err(e);
        }

        let result = self.run_iterations(config);
        if let Err(e) = &result {
            let iteration = match self.state {
                RunState::Running { iteration, .. } => iteration,
                _ => e.iteration().unwrap_or(0),
            };
            self.transition(RunState::Failed { iteration });
        }
        result
    }

    fn run_iterations(&mut self, config: &BenchmarkConfig) -> Result<Vec<IterationReport>> {
        let total = config.iteration_repeat_count;
        let base = self.iterations.pool();
        let timeout = config.iteration_timeout.or(base.timeout());
        let iterations = IterationRunner::new(base.clone().with_timeout(timeout));

        if let Some(sink) = self.sink.as_mut() {
            sink.begin(config)?;
        }

        let mut reports = Vec::with_capacity(total);
        for iteration in 1..=total {
            self.transition(RunState::Running { iteration, of: total });

            let report = iterations.run_iteration(config, iteration)?;
            if let Some(sink) = self.sink.as_mut() {
                sink.iteration(&report)?;
            }
            reports.push(report);
        }

        if let Some(sink) = self.sink.as_mut() {
            sink.finish(&reports)?;
        }

        self.transition(RunState::Completed);
        Ok(reports)
    }

    fn transition(&mut self, next: RunState) {
        tracing::debug!("Run state: {:?} -> {:?}", self.state, next);
        if let RunState::Failed { iteration } = next {
            tracing::warn!("Benchmark failed at iteration {}", iteration);
        }
        self.state = next;
    }
}
