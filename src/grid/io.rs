//! Grid text format
//!
//! ```text
//! N M
//! c00 c01 ... c0(M-1)
//! ...
//! c(N-1)0 ... c(N-1)(M-1)
//! ```
//!
//! Cell codes: `0` empty, `1` healthy, `-1` infected, `-2` dead, `-3` dead
//! for one iteration already. Any whitespace separates values; line breaks
//! are not significant.

use super::{CellState, Grid};
use crate::error::SimulationError;
use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Load a grid from a text file
pub fn load_grid(path: &Path) -> Result<Grid> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read grid file: {}", path.display()))?;

    parse_grid(&contents).with_context(|| format!("Failed to parse grid file: {}", path.display()))
}

/// Parse a grid from its text form
pub fn parse_grid(contents: &str) -> Result<Grid> {
    let mut tokens = contents.split_whitespace();

    let rows = parse_dimension(tokens.next(), "row count")?;
    let cols = parse_dimension(tokens.next(), "column count")?;

    let expected = rows
        .checked_mul(cols)
        .filter(|&cells| cells <= isize::MAX as usize)
        .ok_or_else(|| {
            SimulationError::Configuration(format!("grid {}x{} is too large", rows, cols))
        })?;

    // Every cell takes at least two bytes of input ("1 ")
    let mut cells = Vec::with_capacity(expected.min(contents.len() / 2 + 1));
    for row in 0..rows {
        for col in 0..cols {
            let token = tokens
                .next()
                .with_context(|| format!("Missing value at position [{}][{}]", row, col))?;
            let code: i32 = token
                .parse()
                .with_context(|| format!("Invalid value '{}' at position [{}][{}]", token, row, col))?;
            let state = CellState::from_code(code).with_context(|| {
                format!("Unknown cell code {} at position [{}][{}]", code, row, col)
            })?;
            cells.push(state);
        }
    }

    if tokens.next().is_some() {
        tracing::warn!("grid file has trailing values after {}x{} cells; ignoring them", rows, cols);
    }

    Ok(Grid::new(rows, cols, cells)?)
}

fn parse_dimension(token: Option<&str>, what: &str) -> Result<usize> {
    let token = token
        .ok_or_else(|| SimulationError::Configuration(format!("missing grid {}", what)))?;
    let value: i64 = token.parse().map_err(|_| {
        SimulationError::Configuration(format!("invalid grid {} '{}'", what, token))
    })?;
    if value <= 0 {
        return Err(SimulationError::Configuration(format!(
            "grid {} must be positive, got {}",
            what, value
        ))
        .into());
    }
    Ok(value as usize)
}

/// Write a grid in its text form
pub fn write_grid<W: Write>(grid: &Grid, mut out: W) -> Result<()> {
    writeln!(out, "{} {}", grid.rows(), grid.cols()).context("Failed to write grid header")?;
    for row in 0..grid.rows() {
        let line = grid
            .row(row)
            .iter()
            .map(|cell| cell.code().to_string())
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(out, "{}", line).with_context(|| format!("Failed to write grid row {}", row))?;
    }
    out.flush().context("Failed to flush grid output")?;
    Ok(())
}

/// Save a grid to a text file
pub fn save_grid(grid: &Grid, path: &Path) -> Result<()> {
    let file = fs::File::create(path)
        .with_context(|| format!("Failed to create grid file: {}", path.display()))?;
    write_grid(grid, std::io::BufWriter::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_small_grid() {
        let grid = parse_grid("2 3\n1 0 -1\n-2 -3 1\n").unwrap();

        assert_eq!(grid.rows(), 2);
        assert_eq!(grid.cols(), 3);
        assert_eq!(grid.row(0)[2], CellState::Infected);
        assert_eq!(grid.row(1)[0], CellState::Dead);
        assert_eq!(grid.row(1)[1], CellState::DeadPrior);
    }

    #[test]
    fn test_line_breaks_are_not_significant() {
        let grid = parse_grid("2 2 1 1\n1\n-1").unwrap();
        assert_eq!(grid.row(1)[1], CellState::Infected);
    }

    #[test]
    fn test_missing_dimensions_is_configuration_error() {
        let err = parse_grid("").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SimulationError>(),
            Some(SimulationError::Configuration(_))
        ));

        let err = parse_grid("0 4").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SimulationError>(),
            Some(SimulationError::Configuration(_))
        ));

        let err = parse_grid("3 x").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SimulationError>(),
            Some(SimulationError::Configuration(_))
        ));
    }

    #[test]
    fn test_oversized_header_rejected() {
        let err = parse_grid("4000000000 4000000000\n1 1").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SimulationError>(),
            Some(SimulationError::Configuration(_))
        ));

        // Large but representable: fails on the missing cells, not on allocation
        let err = parse_grid("100000 100000\n1 1").unwrap_err();
        assert!(format!("{:#}", err).contains("Missing value at position [0][2]"));
    }

    #[test]
    fn test_missing_value_names_position() {
        let err = parse_grid("2 2\n1 1\n1").unwrap_err();
        assert!(format!("{:#}", err).contains("[1][1]"));
    }

    #[test]
    fn test_unknown_code_rejected() {
        let err = parse_grid("1 2\n1 7").unwrap_err();
        assert!(format!("{:#}", err).contains("Unknown cell code 7"));
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("grid.txt");
        let grid = parse_grid("3 2\n1 -1\n0 -2\n-3 1").unwrap();

        save_grid(&grid, &path).unwrap();
        let loaded = load_grid(&path).unwrap();
        assert_eq!(loaded, grid);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let err = load_grid(&dir.path().join("absent.txt")).unwrap_err();
        assert!(err.to_string().contains("Failed to read grid file"));
    }
}
