//! Fan-out/fan-in worker pool
//!
//! Every batch gets one named OS thread per work unit. Workers report back
//! over a crossbeam channel tagged with their batch position, so results are
//! returned in submission order no matter which worker finishes first.
//! All threads are joined before `submit` returns.

use crate::core::workload::{CancelToken, CpuStress, WorkUnit, Workload, WorkloadOutcome};
use crate::error::{BenchError, Result};
use crossbeam::channel::{unbounded, RecvTimeoutError, Sender};
use serde::Serialize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Identity of the execution context that ran a work unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkerIdentity {
    /// Position in the batch
    pub slot: usize,
    /// OS process id
    pub process_id: u32,
    /// Thread name assigned by the pool
    pub thread_name: String,
    /// Runtime-assigned thread id
    pub thread_id: String,
}

impl WorkerIdentity {
    fn current(slot: usize) -> Self {
        let current = thread::current();
        Self {
            slot,
            process_id: std::process::id(),
            thread_name: current
                .name()
                .map(str::to_string)
                .unwrap_or_else(|| worker_thread_name(slot)),
            thread_id: format!("{:?}", current.id()),
        }
    }
}

impl std::fmt::Display for WorkerIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.process_id, self.thread_name)
    }
}

/// Timing and value produced by one worker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkerResult {
    /// Who ran the unit
    pub worker: WorkerIdentity,
    /// Wall-clock time spent in the workload
    pub elapsed_seconds: f64,
    /// Value returned by the workload
    pub computed_value: u64,
}

enum WorkerMessage {
    Finished(usize, WorkerResult),
    Cancelled(usize),
    Failed {
        worker: String,
        message: String,
    },
}

fn worker_thread_name(slot: usize) -> String {
    format!("bench-worker-{}", slot)
}

/// Same form as the `WorkerIdentity` display, for workers that never reported one
fn worker_label(slot: usize) -> String {
    format!("{}/{}", std::process::id(), worker_thread_name(slot))
}

/// Pool that runs each batch on freshly spawned OS threads
#[derive(Clone)]
pub struct WorkerPool {
    workload: Arc<dyn Workload>,
    timeout: Option<Duration>,
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("workload", &self.workload.name())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl WorkerPool {
    /// Create a pool running the CPU stress workload without a timeout
    pub fn new() -> Self {
        Self {
            workload: Arc::new(CpuStress),
            timeout: None,
        }
    }

    /// Replace the workload
    pub fn with_workload(mut self, workload: Arc<dyn Workload>) -> Self {
        self.workload = workload;
        self
    }

    /// Set the batch timeout
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Batch timeout, if any
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Name of the workload this pool runs
    pub fn workload_name(&self) -> &str {
        self.workload.name()
    }

    /// Run `units` in parallel and return one result per unit, in order.
    ///
    /// `iteration` is only used for error context. The whole batch fails if
    /// any worker fails, panics, or the timeout expires; in every case the
    /// remaining workers are cancelled and joined first.
    pub fn submit(&self, units: &[WorkUnit], iteration: usize) -> Result<Vec<WorkerResult>> {
        let (tx, rx) = unbounded();
        let cancel = CancelToken::new();
        let mut handles = Vec::with_capacity(units.len());

        for (slot, unit) in units.iter().enumerate() {
            match self.spawn_worker(slot, *unit, tx.clone(), cancel.clone()) {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    cancel.cancel();
                    join_workers(handles);
                    return Err(BenchError::worker(
                        iteration,
                        Some(worker_label(slot)),
                        format!("failed to spawn worker thread: {}", e),
                    ));
                }
            }
        }
        drop(tx);

        tracing::debug!(
            "Iteration {}: dispatched {} units of '{}'",
            iteration,
            units.len(),
            self.workload.name()
        );

        let deadline = self.timeout.map(|timeout| Instant::now() + timeout);
        let mut slots: Vec<Option<WorkerResult>> = (0..units.len()).map(|_| None).collect();
        let mut pending = units.len();
        let mut failure = None;

        while pending > 0 {
            let message = match deadline {
                Some(deadline) => rx.recv_deadline(deadline),
                None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };

            match message {
                Ok(WorkerMessage::Finished(slot, result)) => {
                    slots[slot] = Some(result);
                    pending -= 1;
                }
                Ok(WorkerMessage::Cancelled(slot)) => {
                    failure = Some(BenchError::worker(
                        iteration,
                        Some(worker_label(slot)),
                        "worker was cancelled",
                    ));
                    break;
                }
                Ok(WorkerMessage::Failed { worker, message }) => {
                    failure = Some(BenchError::worker(iteration, Some(worker), message));
                    break;
                }
                Err(RecvTimeoutError::Timeout) => {
                    failure = Some(BenchError::WorkerTimeout {
                        iteration,
                        // Deadline exists whenever the channel reports a timeout
                        timeout: self.timeout.unwrap_or_default(),
                    });
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => {
                    failure = Some(BenchError::worker(
                        iteration,
                        None,
                        "worker exited without reporting a result",
                    ));
                    break;
                }
            }
        }

        if failure.is_some() {
            cancel.cancel();
        }
        join_workers(handles);

        if let Some(err) = failure {
            tracing::warn!("Iteration {}: batch abandoned: {}", iteration, err);
            return Err(err);
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(slot, result)| {
                result.ok_or_else(|| {
                    BenchError::worker(iteration, Some(worker_label(slot)), "missing result")
                })
            })
            .collect()
    }

    fn spawn_worker(
        &self,
        slot: usize,
        unit: WorkUnit,
        tx: Sender<WorkerMessage>,
        cancel: CancelToken,
    ) -> std::io::Result<JoinHandle<()>> {
        let workload = Arc::clone(&self.workload);

        thread::Builder::new()
            .name(worker_thread_name(slot))
            .spawn(move || {
                let worker = WorkerIdentity::current(slot);
                let start = Instant::now();
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| workload.execute(&unit, &cancel)));
                let elapsed_seconds = start.elapsed().as_secs_f64();

                let message = match outcome {
                    Ok(WorkloadOutcome::Completed(computed_value)) => {
                        tracing::debug!(
                            "Worker {} finished in {:.4}s with {}",
                            worker,
                            elapsed_seconds,
                            computed_value
                        );
                        WorkerMessage::Finished(
                            slot,
                            WorkerResult {
                                worker,
                                elapsed_seconds,
                                computed_value,
                            },
                        )
                    }
                    Ok(WorkloadOutcome::Cancelled) => WorkerMessage::Cancelled(slot),
                    Ok(WorkloadOutcome::Failed(message)) => WorkerMessage::Failed {
                        worker: worker.to_string(),
                        message,
                    },
                    Err(payload) => WorkerMessage::Failed {
                        worker: worker.to_string(),
                        message: format!("worker panicked: {}", panic_message(&*payload)),
                    },
                };

                // The collector may already have given up on this batch
                let _ = tx.send(message);
            })
    }
}

fn join_workers(handles: Vec<JoinHandle<()>>) {
    for handle in handles {
        if handle.join().is_err() {
            tracing::warn!("Worker thread terminated abnormally");
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
