//! epigrid CLI entry point

use anyhow::{Context, Result};
use epigrid::config::{cli::Cli, toml::load_config, validator, Config, ExecutionMode};
use epigrid::engine::run_distributed;
use epigrid::grid::generate::generate_grid;
use epigrid::grid::io::{load_grid, save_grid, write_grid};
use epigrid::output;
use epigrid::reference::run_sequential;
use std::path::Path;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    cli.validate()?;

    let config = load_config(&cli)?;
    init_logging(config.runtime.debug)?;

    validator::validate_config(&config).context("Configuration validation failed")?;

    match config.simulation.mode {
        ExecutionMode::Generate => run_generate(&config),
        ExecutionMode::Distributed | ExecutionMode::Sequential => run_simulation(&config),
    }
}

/// Logs go to stderr so generated grids can be piped from stdout
fn init_logging(debug: bool) -> Result<()> {
    let filter = if debug { "epigrid=debug" } else { "epigrid=info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(())
}

/// Simulate the input grid in distributed or sequential mode
fn run_simulation(config: &Config) -> Result<()> {
    println!("epigrid v{}", env!("CARGO_PKG_VERSION"));
    println!("Distributed epidemic cellular automaton");
    println!();

    let input = config
        .simulation
        .input
        .as_deref()
        .context("No input grid file given")?;

    print_configuration(config, input);

    if config.runtime.dry_run {
        println!();
        println!("Dry run mode - configuration validated successfully");
        return Ok(());
    }

    let grid = load_grid(input)?;
    tracing::info!(rows = grid.rows(), cols = grid.cols(), path = %input.display(), "loaded grid");

    let engine = config.engine_config();
    let summary = match config.simulation.mode {
        ExecutionMode::Sequential => run_sequential(grid, &engine)?,
        _ => run_distributed(grid, &engine)?,
    };

    if !config.output.quiet {
        println!();
        output::print_results(&summary);
    }

    if let Some(path) = &config.output.summary {
        output::save_summary(&summary, path)?;
        tracing::info!(path = %path.display(), "summary written");
    }

    if let Some(path) = &config.output.json_output {
        output::write_json_report(&summary, path, true)?;
        tracing::info!(path = %path.display(), "JSON report written");
    }

    Ok(())
}

/// Generate a random input grid
fn run_generate(config: &Config) -> Result<()> {
    let generate = &config.generate;
    let (rows, cols) = match (generate.rows, generate.cols) {
        (Some(rows), Some(cols)) => (rows, cols),
        _ => anyhow::bail!("generate mode requires --rows and --cols"),
    };

    if config.runtime.dry_run {
        println!(
            "Dry run mode - would generate a {} x {} grid with {} infected (seed {})",
            rows, cols, generate.infected, generate.seed
        );
        return Ok(());
    }

    let grid = generate_grid(rows, cols, generate.infected, generate.seed)?;

    match &config.output.summary {
        Some(path) => {
            save_grid(&grid, path)?;
            tracing::info!(rows, cols, path = %path.display(), "grid generated");
        }
        None => write_grid(&grid, std::io::stdout().lock())?,
    }

    Ok(())
}

fn print_configuration(config: &Config, input: &Path) {
    let simulation = &config.simulation;

    println!("Configuration:");
    println!("  Input: {}", input.display());
    println!("  Mode: {}", simulation.mode);
    if simulation.mode == ExecutionMode::Distributed {
        println!("  Workers: {}", simulation.workers);
    }
    match simulation.seed {
        Some(seed) => println!("  Seed: {}", seed),
        None => println!("  Seed: from clock (not reproducible)"),
    }
    if let Some(max) = simulation.max_iterations {
        println!("  Max iterations: {}", max);
    }
    println!("  Report interval: {}", simulation.report_interval);

    println!("  Output:");
    if let Some(ref path) = config.output.summary {
        println!("    Summary: {}", path.display());
    }
    if let Some(ref path) = config.output.json_output {
        println!("    JSON: {}", path.display());
    }
}
