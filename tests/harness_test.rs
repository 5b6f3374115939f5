//! End-to-end benchmark runs through the public API

use pcbench::config::BenchmarkConfig;
use pcbench::core::{
    compute, BenchmarkRunner, CancelToken, RunState, WorkUnit, WorkerPool, Workload, WorkloadOutcome,
};
use pcbench::error::BenchError;
use pcbench::report::{FileSink, MultiSink, TextSink};
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// Writer whose buffer stays readable after the sink is moved into a runner
#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Fails on one slot, succeeds everywhere else
struct FailingSlot(usize);

impl Workload for FailingSlot {
    fn name(&self) -> &str {
        "failing-slot"
    }

    fn execute(&self, unit: &WorkUnit, _cancel: &CancelToken) -> WorkloadOutcome {
        if unit.slot == self.0 {
            WorkloadOutcome::Failed("injected failure".to_string())
        } else {
            WorkloadOutcome::Completed(compute(unit.iteration_count))
        }
    }
}

/// Never finishes until cancelled
struct Hangs;

impl Workload for Hangs {
    fn name(&self) -> &str {
        "hangs"
    }

    fn execute(&self, _unit: &WorkUnit, cancel: &CancelToken) -> WorkloadOutcome {
        while !cancel.is_cancelled() {
            std::thread::sleep(Duration::from_millis(5));
        }
        WorkloadOutcome::Cancelled
    }
}

// ============================================================================
// Successful runs
// ============================================================================

#[test]
fn test_zero_iterations_yield_zero_values() {
    let config = BenchmarkConfig::new(0, 4, 1);
    let mut runner = BenchmarkRunner::new();

    let reports = runner.run(&config).unwrap();

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].iteration_index, 1);
    assert_eq!(reports[0].results.len(), 4);
    assert!(reports[0].results.iter().all(|r| r.computed_value == 0));
    assert!(reports[0].total_elapsed_seconds >= 0.0);
    assert_eq!(runner.state(), RunState::Completed);
}

#[test]
fn test_repeated_iterations_are_identical() {
    let config = BenchmarkConfig::new(1000, 1, 3);
    let mut runner = BenchmarkRunner::new();

    let reports = runner.run(&config).unwrap();

    let indices: Vec<usize> = reports.iter().map(|r| r.iteration_index).collect();
    assert_eq!(indices, vec![1, 2, 3]);
    for report in &reports {
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].computed_value, 2993);
    }
}

#[test]
fn test_results_follow_submission_order() {
    let config = BenchmarkConfig::new(10_000, 8, 1);
    let mut runner = BenchmarkRunner::new();

    let reports = runner.run(&config).unwrap();
    let results = &reports[0].results;

    assert_eq!(results.len(), 8);
    for (slot, result) in results.iter().enumerate() {
        assert_eq!(result.worker.slot, slot);
        assert_eq!(result.worker.thread_name, format!("bench-worker-{}", slot));
        assert_eq!(result.worker.process_id, std::process::id());
        assert_eq!(result.computed_value, compute(10_000));
    }
}

#[test]
fn test_iteration_total_covers_slowest_worker() {
    let config = BenchmarkConfig::new(200_000, 4, 2);
    let mut runner = BenchmarkRunner::new();

    for report in runner.run(&config).unwrap() {
        assert!(report.total_elapsed_seconds >= report.slowest_worker_seconds());
        assert!(report.results.iter().all(|r| r.elapsed_seconds >= 0.0));
    }
}

#[test]
fn test_larger_workload_takes_longer() {
    let mut runner = BenchmarkRunner::new();

    let small = runner.run(&BenchmarkConfig::new(100_000, 1, 1)).unwrap();
    let large = runner.run(&BenchmarkConfig::new(20_000_000, 1, 1)).unwrap();

    assert!(large[0].results[0].elapsed_seconds > small[0].results[0].elapsed_seconds);
}

#[test]
fn test_text_and_file_output() {
    let dir = TempDir::new().unwrap();
    let console = SharedBuffer::default();
    let generated = chrono::Local::now();
    let file_sink = FileSink::with_host(dir.path(), "testhost", generated);
    let path = file_sink.path().to_path_buf();

    let mut sinks = MultiSink::new();
    sinks.push(Box::new(TextSink::new(console.clone())));
    sinks.push(Box::new(file_sink));

    let mut runner = BenchmarkRunner::new().with_sink(Box::new(sinks));
    runner.run(&BenchmarkConfig::new(1000, 2, 2)).unwrap();

    let text = console.contents();
    assert!(text.starts_with("Running benchmark with 2 parallel workers, each with 1000 iterations..."));
    assert_eq!(text.matches("Result: 2993").count(), 4);
    assert!(text.contains("Total time for iteration 1: "));
    assert!(text.contains("Total time for iteration 2: "));

    let saved = std::fs::read_to_string(&path).unwrap();
    assert!(saved.starts_with("Benchmark report for testhost"));
    assert_eq!(saved.matches("Result: 2993").count(), 4);
    assert!(path
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("pctesthost_threads_"));
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_worker_failure_aborts_run() {
    let console = SharedBuffer::default();
    let pool = WorkerPool::new().with_workload(Arc::new(FailingSlot(1)));
    let mut runner = BenchmarkRunner::with_pool(pool).with_sink(Box::new(TextSink::new(console.clone())));

    let err = runner.run(&BenchmarkConfig::new(1000, 3, 2)).unwrap_err();

    match err {
        BenchError::WorkerExecution {
            iteration, message, ..
        } => {
            assert_eq!(iteration, 1);
            assert_eq!(message, "injected failure");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(runner.state(), RunState::Failed { iteration: 1 });
    assert!(!console.contents().contains("Total time for iteration"));
}

#[test]
fn test_stalled_iteration_times_out() {
    let pool = WorkerPool::new().with_workload(Arc::new(Hangs));
    let mut runner = BenchmarkRunner::with_pool(pool);
    let config = BenchmarkConfig::new(1, 2, 3).with_timeout(Duration::from_millis(100));

    let err = runner.run(&config).unwrap_err();

    assert!(matches!(err, BenchError::WorkerTimeout { iteration: 1, .. }));
    assert_eq!(err.iteration(), Some(1));
    assert_eq!(runner.state(), RunState::Failed { iteration: 1 });
}

#[test]
fn test_invalid_config_dispatches_nothing() {
    let mut runner = BenchmarkRunner::new();

    let err = runner.run(&BenchmarkConfig::new(1000, 0, 1)).unwrap_err();

    assert!(matches!(err, BenchError::Configuration(_)));
    assert_eq!(runner.state(), RunState::Failed { iteration: 0 });
}
