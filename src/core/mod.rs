//! Core benchmark harness
//!
//! Provides the CPU-bound workload, the fan-out/fan-in worker pool,
//! single iterations, and the sequential benchmark runner.

mod iteration;
mod pool;
mod runner;
mod workload;

pub use iteration::*;
pub use pool::*;
pub use runner::*;
pub use workload::*;
