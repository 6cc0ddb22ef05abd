//! Configuration module
//!
//! Handles CLI argument parsing, TOML configuration files, and validation.

pub mod cli;
pub mod toml;
pub mod validator;

use crate::engine::{EngineConfig, DEFAULT_REPORT_INTERVAL};
use crate::grid::generate::DEFAULT_GENERATE_SEED;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Complete run configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub generate: GenerateConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

/// What a run does
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Partitioned run with one worker thread per partition (default)
    #[default]
    Distributed,
    /// Single-threaded reference run over the whole grid
    Sequential,
    /// Write a random input grid instead of simulating
    Generate,
}

impl ExecutionMode {
    /// Whether this mode runs a simulation (and needs an input grid)
    pub fn simulates(self) -> bool {
        !matches!(self, ExecutionMode::Generate)
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::Distributed => write!(f, "distributed"),
            ExecutionMode::Sequential => write!(f, "sequential"),
            ExecutionMode::Generate => write!(f, "generate"),
        }
    }
}

/// Simulation settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SimulationConfig {
    /// Grid file to simulate
    pub input: Option<PathBuf>,
    /// Execution mode
    #[serde(default)]
    pub mode: ExecutionMode,
    /// Number of workers (partitions)
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Base random seed; omitted means seeded from the clock
    pub seed: Option<u64>,
    /// Lower iteration cap (never above rows × cols)
    pub max_iterations: Option<usize>,
    /// Iterations between progress lines
    #[serde(default = "default_report_interval")]
    pub report_interval: usize,
}

fn default_workers() -> usize {
    num_cpus::get()
}

fn default_report_interval() -> usize {
    DEFAULT_REPORT_INTERVAL
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            input: None,
            mode: ExecutionMode::default(),
            workers: default_workers(),
            seed: None,
            max_iterations: None,
            report_interval: default_report_interval(),
        }
    }
}

/// Input generation settings (generate mode)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerateConfig {
    pub rows: Option<usize>,
    pub cols: Option<usize>,
    /// Number of infection seeds placed at random
    #[serde(default = "default_infected")]
    pub infected: usize,
    #[serde(default = "default_generate_seed")]
    pub seed: u64,
}

fn default_infected() -> usize {
    5
}

fn default_generate_seed() -> u64 {
    DEFAULT_GENERATE_SEED
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            rows: None,
            cols: None,
            infected: default_infected(),
            seed: default_generate_seed(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputConfig {
    /// Summary text file (simulation modes) or grid file (generate mode)
    #[serde(default = "default_summary_path")]
    pub summary: Option<PathBuf>,
    /// JSON report file
    pub json_output: Option<PathBuf>,
    /// Skip the console results block
    #[serde(default)]
    pub quiet: bool,
}

fn default_summary_path() -> Option<PathBuf> {
    Some(PathBuf::from("result.txt"))
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            summary: default_summary_path(),
            json_output: None,
            quiet: false,
        }
    }
}

/// Runtime configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Dry run mode
    #[serde(default)]
    pub dry_run: bool,
    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

impl Config {
    /// Engine settings derived from this configuration
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            workers: self.simulation.workers,
            seed: self.simulation.seed,
            max_iterations: self.simulation.max_iterations,
            report_interval: self.simulation.report_interval,
        }
    }
}
