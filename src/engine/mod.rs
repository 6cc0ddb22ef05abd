//! Distributed simulation engine
//!
//! The grid is split into row partitions, one per worker thread. Every
//! iteration is a superstep in lockstep across all workers:
//!
//! ```text
//! Coordinator ──distribute──► workers ◄──halo exchange──► workers
//!      ▲                         │
//!      └───────gather────────────┘ compute
//!      │
//!      └──decide──► broadcast continue/stop
//! ```
//!
//! # Modules
//!
//! - `partition`: static row ranges per worker
//! - `halo`: boundary row exchange between adjacent workers
//! - `stepper`: the pure per-block transition rule
//! - `aggregate`: population counts and the continuation decision
//! - `coordinator`: superstep orchestration
//! - `worker`: per-partition superstep loop
//! - `protocol`: coordinator ↔ worker messages

pub mod aggregate;
pub mod coordinator;
pub mod halo;
pub mod partition;
pub mod protocol;
pub mod stepper;
pub mod worker;

use crate::grid::{Grid, PopulationCounts};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub use coordinator::run_distributed;
pub use partition::{PartitionTable, RowRange};

/// Default number of iterations between progress lines
pub const DEFAULT_REPORT_INTERVAL: usize = 100;

/// Phases of one superstep, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Distribute,
    Exchange,
    Compute,
    Gather,
    Decide,
}

impl Phase {
    /// All phases in execution order
    pub const ALL: [Phase; 5] = [
        Phase::Distribute,
        Phase::Exchange,
        Phase::Compute,
        Phase::Gather,
        Phase::Decide,
    ];
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Distribute => "distribute",
            Phase::Exchange => "exchange",
            Phase::Compute => "compute",
            Phase::Gather => "gather",
            Phase::Decide => "decide",
        };
        f.write_str(name)
    }
}

/// Why a run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// No infected cells remain
    Extinct,
    /// The iteration cap was reached with infection still present
    IterationCap,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Extinct => f.write_str("infection extinct"),
            Termination::IterationCap => f.write_str("iteration cap reached"),
        }
    }
}

/// Engine settings for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Number of workers (partitions)
    pub workers: usize,
    /// Base seed; `None` derives one from the wall clock
    pub seed: Option<u64>,
    /// Optional cap below `rows * cols`
    pub max_iterations: Option<usize>,
    /// Iterations between progress lines
    pub report_interval: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workers: 1,
            seed: None,
            max_iterations: None,
            report_interval: DEFAULT_REPORT_INTERVAL,
        }
    }
}

impl EngineConfig {
    /// Seed actually used for the run
    ///
    /// Without an explicit seed, runs are not reproducible.
    pub fn resolved_seed(&self) -> u64 {
        self.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0)
        })
    }

    /// Maximum iterations for `grid`: `rows * cols`, or lower if configured
    pub fn iteration_cap(&self, grid: &Grid) -> usize {
        let full = grid.cell_count();
        match self.max_iterations {
            Some(max) => max.clamp(1, full),
            None => full,
        }
    }
}

/// Outcome of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub rows: usize,
    pub cols: usize,
    pub workers: usize,
    pub seed: u64,
    pub iterations: usize,
    /// Census of the final grid
    pub counts: PopulationCounts,
    pub elapsed: Duration,
    pub termination: Termination,
}

impl RunSummary {
    pub fn healthy(&self) -> u64 {
        self.counts.healthy
    }

    pub fn infected(&self) -> u64 {
        self.counts.infected
    }

    /// Dead and DeadPrior cells
    pub fn dead(&self) -> u64 {
        self.counts.dead_total()
    }

    /// Healthy and infected cells
    pub fn survivors(&self) -> u64 {
        self.counts.survivors()
    }
}
