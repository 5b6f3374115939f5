//! Report rendering module
//!
//! Sinks for benchmark results (console text, timestamped text file, JSON)
//! and the HTML system report.

mod file;
mod html;
mod json;
mod sink;

pub use file::*;
pub use html::*;
pub use json::*;
pub use sink::*;
