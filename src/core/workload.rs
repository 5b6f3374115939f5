//! CPU-bound workload executed by benchmark workers
//!
//! The workload is a plain scalar accumulation whose running time is
//! proportional to the iteration count. It is deterministic, so results can
//! be compared across runs and machines.

use std::hint::black_box;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Iterations evaluated between two cancellation checks
pub const CANCEL_CHECK_INTERVAL: u64 = 1 << 20;

/// Sum of `(i mod 7) * (i mod 3)` for `i` in `[0, n)`.
///
/// Every term is evaluated; `black_box` keeps the optimiser from replacing
/// the loop with a closed form.
pub fn compute(n: u64) -> u64 {
    compute_range(0, n)
}

/// Same sum as [`compute`], evaluated in chunks of [`CANCEL_CHECK_INTERVAL`].
///
/// Returns `None` as soon as `cancel` is observed between two chunks.
pub fn compute_cancellable(n: u64, cancel: &CancelToken) -> Option<u64> {
    let mut total = 0u64;
    let mut start = 0u64;

    while start < n {
        if cancel.is_cancelled() {
            return None;
        }
        let end = start.saturating_add(CANCEL_CHECK_INTERVAL).min(n);
        total = total.wrapping_add(compute_range(start, end));
        start = end;
    }

    Some(total)
}

fn compute_range(start: u64, end: u64) -> u64 {
    let mut total = 0u64;
    for i in start..end {
        let i = black_box(i);
        total = total.wrapping_add((i % 7) * (i % 3));
    }
    total
}

/// One worker's share of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkUnit {
    /// Position of this unit in its batch
    pub slot: usize,
    /// Workload iterations to perform
    pub iteration_count: u64,
}

impl WorkUnit {
    /// Create a work unit for batch position `slot`
    pub fn new(slot: usize, iteration_count: u64) -> Self {
        Self {
            slot,
            iteration_count,
        }
    }
}

/// Cooperative cancellation flag shared by the workers of one batch
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a token that is not cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Check if cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// How a workload invocation ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkloadOutcome {
    /// Finished with the computed value
    Completed(u64),
    /// Stopped early because the batch was cancelled
    Cancelled,
    /// Failed with a message
    Failed(String),
}

/// Computation run by every worker of a batch
pub trait Workload: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Run the workload for one unit
    fn execute(&self, unit: &WorkUnit, cancel: &CancelToken) -> WorkloadOutcome;
}

/// The CPU stress workload
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuStress;

impl Workload for CpuStress {
    fn name(&self) -> &str {
        "cpu-stress"
    }

    fn execute(&self, unit: &WorkUnit, cancel: &CancelToken) -> WorkloadOutcome {
        match compute_cancellable(unit.iteration_count, cancel) {
            Some(value) => WorkloadOutcome::Completed(value),
            None => WorkloadOutcome::Cancelled,
        }
    }
}
