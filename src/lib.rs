//! epigrid - Distributed epidemic cellular automaton
//!
//! Simulates the spread of an infection over a rectangular grid of cells.
//! Each cell is empty, healthy, infected, dead, or recently dead; infected
//! cells expose their four neighbours and then recover, die, or stay
//! infected at random.
//!
//! # Architecture
//!
//! - **Grid**: cell states, census counts, text I/O and random generation
//! - **Engine**: row partitions stepped by worker threads in lockstep, with
//!   halo rows exchanged between neighbours and a coordinator that gathers
//!   the grid and decides whether to continue
//! - **Reference**: single-threaded run matching the one-worker engine
//! - **Output**: console results, summary file, JSON report

pub mod config;
pub mod engine;
pub mod error;
pub mod grid;
pub mod output;
pub mod reference;

pub use config::Config;
pub use engine::{run_distributed, EngineConfig, RunSummary, Termination};
pub use error::SimulationError;
pub use grid::{CellState, Grid, PopulationCounts};
pub use reference::run_sequential;

/// Result type used throughout epigrid
pub type Result<T> = anyhow::Result<T>;
