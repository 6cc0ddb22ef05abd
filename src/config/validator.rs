//! Configuration validation

use super::*;
use anyhow::Result;

/// Validate complete configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_simulation(&config.simulation)?;
    if config.simulation.mode == ExecutionMode::Generate {
        validate_generate(&config.generate)?;
    }
    validate_output(&config.output)?;

    Ok(())
}

/// Validate simulation settings
pub fn validate_simulation(simulation: &SimulationConfig) -> Result<()> {
    if simulation.workers == 0 {
        anyhow::bail!("workers must be at least 1");
    }

    if simulation.report_interval == 0 {
        anyhow::bail!("report_interval must be at least 1");
    }

    if simulation.max_iterations == Some(0) {
        anyhow::bail!("max_iterations must be at least 1");
    }

    if simulation.mode.simulates() && simulation.input.is_none() {
        anyhow::bail!("{} mode requires an input grid file", simulation.mode);
    }

    Ok(())
}

/// Validate grid generation settings
pub fn validate_generate(generate: &GenerateConfig) -> Result<()> {
    let rows = match generate.rows {
        Some(rows) if rows > 0 => rows,
        Some(_) => anyhow::bail!("rows must be at least 1"),
        None => anyhow::bail!("generate mode requires --rows"),
    };
    let cols = match generate.cols {
        Some(cols) if cols > 0 => cols,
        Some(_) => anyhow::bail!("cols must be at least 1"),
        None => anyhow::bail!("generate mode requires --cols"),
    };

    if rows.checked_mul(cols).is_none() {
        anyhow::bail!("grid of {} x {} cells is too large", rows, cols);
    }

    Ok(())
}

/// Validate output configuration
pub fn validate_output(output: &OutputConfig) -> Result<()> {
    if let (Some(summary), Some(json)) = (&output.summary, &output.json_output) {
        if summary == json {
            anyhow::bail!(
                "summary and JSON output both point to {}",
                summary.display()
            );
        }
    }

    Ok(())
}
