//! CLI argument parsing using clap

use crate::config::ExecutionMode;
use clap::Parser;
use std::path::PathBuf;

/// epigrid - distributed epidemic cellular automaton
#[derive(Parser, Debug)]
#[command(name = "epigrid")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Grid file to simulate (not used in generate mode)
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// Execution mode: distributed, sequential, or generate
    #[arg(long, value_enum)]
    pub mode: Option<ExecutionMode>,

    /// TOML configuration file
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    // === Simulation Options ===
    /// Number of workers (partitions); defaults to the number of CPUs
    #[arg(short = 'w', long, env = "EPIGRID_WORKERS")]
    pub workers: Option<usize>,

    /// Base random seed (runs are reproducible only with a seed)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Stop after this many iterations (never more than rows × cols)
    #[arg(long)]
    pub max_iterations: Option<usize>,

    /// Iterations between progress lines
    #[arg(long)]
    pub report_interval: Option<usize>,

    // === Output Options ===
    /// Summary file (simulation modes) or grid file (generate mode)
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Also write a JSON report to this file
    #[arg(long)]
    pub json_output: Option<PathBuf>,

    /// Don't print the results block
    #[arg(short = 'q', long)]
    pub quiet: bool,

    // === Generate Options ===
    /// Rows of the generated grid
    #[arg(long)]
    pub rows: Option<usize>,

    /// Columns of the generated grid
    #[arg(long)]
    pub cols: Option<usize>,

    /// Number of infected cells to place in the generated grid
    #[arg(long)]
    pub infected: Option<usize>,

    /// Seed for grid generation
    #[arg(long)]
    pub generate_seed: Option<u64>,

    // === Runtime Options ===
    /// Validate configuration and exit without running
    #[arg(long)]
    pub dry_run: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate CLI arguments that don't depend on a config file
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.workers == Some(0) {
            anyhow::bail!("workers must be at least 1");
        }

        if self.report_interval == Some(0) {
            anyhow::bail!("report_interval must be at least 1");
        }

        if self.max_iterations == Some(0) {
            anyhow::bail!("max_iterations must be at least 1");
        }

        if self.mode == Some(ExecutionMode::Generate) && self.input.is_some() {
            anyhow::bail!("generate mode takes no input grid; use --output for the generated file");
        }

        Ok(())
    }
}
