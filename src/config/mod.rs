//! Configuration module for pcbench
//!
//! Provides CLI arguments, benchmark parameters and report options.

mod settings;

pub use settings::*;
