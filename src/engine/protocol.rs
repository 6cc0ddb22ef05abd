//! Coordinator ↔ worker messages
//!
//! # Message Flow
//!
//! ```text
//! Coordinator                     Worker i
//!     |                              |
//!     |---- DISTRIBUTE(k, rows) ---->|
//!     |                              |<==> halo exchange with i-1, i+1
//!     |                              |     compute
//!     |<--- RESULT(k, rows, counts) -|
//!     |                              |
//!     |---- DECISION(k, proceed) --->|
//!     |                              |
//! ```
//!
//! A worker starts iteration `k + 1` only after it has received the
//! decision for iteration `k`. A worker that fails reports `FAILED` on the
//! result channel before exiting, so the coordinator never waits on a
//! result that will not come.

use crate::grid::{CellState, PopulationCounts};

/// Coordinator → worker
#[derive(Debug, Clone)]
pub enum Command {
    /// The worker's rows for iteration `iteration`
    Distribute {
        iteration: usize,
        rows: Vec<CellState>,
    },
    /// Continuation decision taken after iteration `iteration`
    Decision { iteration: usize, proceed: bool },
}

/// Worker → coordinator
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    /// Rows computed for one iteration
    Completed(PartitionResult),
    /// The worker stopped and will send nothing more
    Failed { worker: usize, reason: String },
}

/// Next state of one partition
#[derive(Debug, Clone)]
pub struct PartitionResult {
    pub worker: usize,
    pub iteration: usize,
    /// Next state of the worker's rows, flattened
    pub rows: Vec<CellState>,
    /// Counts over `rows`
    pub counts: PopulationCounts,
}
