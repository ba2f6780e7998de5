//! CLI-facing diagnostics, progress reporting, and outcome shaping.

pub mod diagnostics;
mod outcome;
pub mod progress;

pub use outcome::{CommandStatus, ExecutionOutcome};
