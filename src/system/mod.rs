//! System analysis and resource detection module
//!
//! Provides hardware/OS introspection, optional capability probes,
//! and a disk speed test for the system report.

mod disk;
mod probe;
mod resources;

pub use disk::*;
pub use probe::*;
pub use resources::*;
