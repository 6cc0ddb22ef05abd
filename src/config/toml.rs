//! TOML configuration file parsing

use super::*;
use crate::config::cli::Cli;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Parse TOML configuration file
pub fn parse_toml_file(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_toml_string(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse TOML configuration from string
pub fn parse_toml_string(contents: &str) -> Result<Config> {
    let config: Config = ::toml::from_str(contents)
        .context("Failed to parse TOML configuration")?;

    Ok(config)
}

/// Merge CLI arguments with TOML configuration (CLI takes precedence)
pub fn merge_cli_with_config(cli: &Cli, mut config: Config) -> Result<Config> {
    // Simulation
    if let Some(input) = &cli.input {
        config.simulation.input = Some(input.clone());
    }
    if let Some(mode) = cli.mode {
        config.simulation.mode = mode;
    }
    if let Some(workers) = cli.workers {
        config.simulation.workers = workers;
    }
    if cli.seed.is_some() {
        config.simulation.seed = cli.seed;
    }
    if cli.max_iterations.is_some() {
        config.simulation.max_iterations = cli.max_iterations;
    }
    if let Some(interval) = cli.report_interval {
        config.simulation.report_interval = interval;
    }

    // Generate
    if cli.rows.is_some() {
        config.generate.rows = cli.rows;
    }
    if cli.cols.is_some() {
        config.generate.cols = cli.cols;
    }
    if let Some(infected) = cli.infected {
        config.generate.infected = infected;
    }
    if let Some(seed) = cli.generate_seed {
        config.generate.seed = seed;
    }

    // Output
    if let Some(output) = &cli.output {
        config.output.summary = Some(output.clone());
    } else if config.simulation.mode == ExecutionMode::Generate
        && config.output.summary == default_summary_path()
    {
        // Generated grids go to stdout unless a file is named
        config.output.summary = None;
    }
    if let Some(json) = &cli.json_output {
        config.output.json_output = Some(json.clone());
    }
    if cli.quiet {
        config.output.quiet = true;
    }

    // Runtime
    if cli.dry_run {
        config.runtime.dry_run = true;
    }
    if cli.debug {
        config.runtime.debug = true;
    }

    Ok(config)
}

/// Build the effective configuration from the command line
///
/// Loads `--config` if given, otherwise starts from defaults, then applies
/// CLI overrides.
pub fn load_config(cli: &Cli) -> Result<Config> {
    let base = match &cli.config {
        Some(path) => parse_toml_file(path)?,
        None => Config::default(),
    };
    merge_cli_with_config(cli, base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_toml_basic() {
        let toml = r#"
[simulation]
input = "grid.txt"
mode = "sequential"
workers = 3
seed = 11
max_iterations = 500

[output]
summary = "out/result.txt"
json_output = "out/result.json"
"#;

        let config = parse_toml_string(toml).unwrap();
        assert_eq!(config.simulation.input, Some(PathBuf::from("grid.txt")));
        assert_eq!(config.simulation.mode, ExecutionMode::Sequential);
        assert_eq!(config.simulation.workers, 3);
        assert_eq!(config.simulation.seed, Some(11));
        assert_eq!(config.simulation.max_iterations, Some(500));
        assert_eq!(config.simulation.report_interval, 100);
        assert_eq!(config.output.summary, Some(PathBuf::from("out/result.txt")));
        assert_eq!(config.output.json_output, Some(PathBuf::from("out/result.json")));
    }

    #[test]
    fn test_parse_toml_empty_uses_defaults() {
        let config = parse_toml_string("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_parse_toml_generate_section() {
        let toml = r#"
[simulation]
mode = "generate"

[generate]
rows = 40
cols = 60
infected = 12
"#;

        let config = parse_toml_string(toml).unwrap();
        assert_eq!(config.generate.rows, Some(40));
        assert_eq!(config.generate.cols, Some(60));
        assert_eq!(config.generate.infected, 12);
        assert_eq!(config.generate.seed, 42);
    }

    #[test]
    fn test_parse_toml_rejects_unknown_mode() {
        let toml = r#"
[simulation]
mode = "cluster"
"#;
        assert!(parse_toml_string(toml).is_err());
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[simulation]\nworkers = 2\nseed = 5\ninput = \"a.txt\"").unwrap();
        let path = file.path().to_str().unwrap();

        let cli = Cli::try_parse_from(["epigrid", "b.txt", "-c", path, "-w", "8"]).unwrap();
        let config = load_config(&cli).unwrap();

        assert_eq!(config.simulation.workers, 8);
        assert_eq!(config.simulation.seed, Some(5));
        assert_eq!(config.simulation.input, Some(PathBuf::from("b.txt")));
    }

    #[test]
    fn test_generate_defaults_to_stdout() {
        let cli = Cli::try_parse_from(["epigrid", "--mode", "generate", "--rows", "3", "--cols", "3"])
            .unwrap();
        let config = load_config(&cli).unwrap();
        assert_eq!(config.output.summary, None);
    }

    #[test]
    fn test_missing_config_file() {
        let cli = Cli::try_parse_from(["epigrid", "-c", "/nonexistent/epigrid.toml"]).unwrap();
        let err = load_config(&cli).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to read config file"));
    }
}
