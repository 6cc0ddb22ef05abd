//! Grid data model
//!
//! A grid is `rows × cols` cells stored row-major. The full grid exists only
//! at the coordinator between iterations; workers hold copies of their own
//! rows plus two halo rows.
//!
//! # Cell states
//!
//! ```text
//! Empty ──────────────────────────────► Empty
//! Healthy ──(infectious neighbour)────► Infected
//! Infected ──(draw)───────────────────► Healthy | Infected | Dead
//! Dead ───────────────────────────────► DeadPrior
//! DeadPrior ──────────────────────────► Empty
//! ```

pub mod generate;
pub mod io;

use crate::error::SimulationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Health state of a single cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CellState {
    #[default]
    Empty,
    Healthy,
    Infected,
    Dead,
    /// Dead for one iteration already; decays to `Empty` next
    DeadPrior,
}

impl CellState {
    /// Decode the integer code used by the grid text format
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(CellState::Empty),
            1 => Some(CellState::Healthy),
            -1 => Some(CellState::Infected),
            -2 => Some(CellState::Dead),
            -3 => Some(CellState::DeadPrior),
            _ => None,
        }
    }

    /// Integer code used by the grid text format
    pub fn code(self) -> i32 {
        match self {
            CellState::Empty => 0,
            CellState::Healthy => 1,
            CellState::Infected => -1,
            CellState::Dead => -2,
            CellState::DeadPrior => -3,
        }
    }

    /// Whether this cell infects a healthy von Neumann neighbour
    #[inline]
    pub fn is_infectious(self) -> bool {
        matches!(
            self,
            CellState::Infected | CellState::Dead | CellState::DeadPrior
        )
    }
}

impl fmt::Display for CellState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CellState::Empty => "empty",
            CellState::Healthy => "healthy",
            CellState::Infected => "infected",
            CellState::Dead => "dead",
            CellState::DeadPrior => "dead-prior",
        };
        f.write_str(name)
    }
}

/// Per-state population counts
///
/// Counts are additive: partial counts from any set of disjoint regions
/// sum to the counts of their union, in any order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PopulationCounts {
    pub empty: u64,
    pub healthy: u64,
    pub infected: u64,
    pub dead: u64,
    pub dead_prior: u64,
}

impl PopulationCounts {
    /// Count the states in a slice of cells
    pub fn of(cells: &[CellState]) -> Self {
        let mut counts = Self::default();
        for &cell in cells {
            counts.record(cell);
        }
        counts
    }

    #[inline]
    pub fn record(&mut self, cell: CellState) {
        match cell {
            CellState::Empty => self.empty += 1,
            CellState::Healthy => self.healthy += 1,
            CellState::Infected => self.infected += 1,
            CellState::Dead => self.dead += 1,
            CellState::DeadPrior => self.dead_prior += 1,
        }
    }

    /// Dead and DeadPrior together, as reported in run summaries
    pub fn dead_total(&self) -> u64 {
        self.dead + self.dead_prior
    }

    /// Healthy and Infected together
    pub fn survivors(&self) -> u64 {
        self.healthy + self.infected
    }

    /// Number of cells counted
    pub fn total(&self) -> u64 {
        self.empty + self.healthy + self.infected + self.dead + self.dead_prior
    }
}

impl Add for PopulationCounts {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl AddAssign for PopulationCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.empty += rhs.empty;
        self.healthy += rhs.healthy;
        self.infected += rhs.infected;
        self.dead += rhs.dead;
        self.dead_prior += rhs.dead_prior;
    }
}

impl Sum for PopulationCounts {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// Row-major grid of cell states
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<CellState>,
}

impl Grid {
    /// Build a grid from row-major cells
    ///
    /// Fails if either dimension is zero or `cells` does not hold exactly
    /// `rows * cols` entries.
    pub fn new(rows: usize, cols: usize, cells: Vec<CellState>) -> Result<Self, SimulationError> {
        if rows == 0 || cols == 0 {
            return Err(SimulationError::Configuration(format!(
                "grid dimensions must be positive, got {}x{}",
                rows, cols
            )));
        }
        let expected = rows.checked_mul(cols).ok_or_else(|| {
            SimulationError::Configuration(format!("grid {}x{} is too large", rows, cols))
        })?;
        if cells.len() != expected {
            return Err(SimulationError::Configuration(format!(
                "grid {}x{} needs {} cells, got {}",
                rows,
                cols,
                expected,
                cells.len()
            )));
        }
        Ok(Self { rows, cols, cells })
    }

    /// Grid with every cell set to `state`
    pub fn filled(rows: usize, cols: usize, state: CellState) -> Result<Self, SimulationError> {
        Self::new(rows, cols, vec![state; rows.saturating_mul(cols)])
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `rows * cols`
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn cells(&self) -> &[CellState] {
        &self.cells
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, state: CellState) {
        self.cells[row * self.cols + col] = state;
    }

    /// One row as a slice
    pub fn row(&self, row: usize) -> &[CellState] {
        self.row_range(row, 1)
    }

    /// `len` consecutive rows starting at `start`, flattened
    pub fn row_range(&self, start: usize, len: usize) -> &[CellState] {
        &self.cells[start * self.cols..(start + len) * self.cols]
    }

    /// Overwrite consecutive rows starting at `start`
    ///
    /// `rows` must be a whole number of rows that fits inside the grid.
    pub fn write_rows(&mut self, start: usize, rows: &[CellState]) {
        debug_assert_eq!(rows.len() % self.cols, 0);
        let offset = start * self.cols;
        self.cells[offset..offset + rows.len()].copy_from_slice(rows);
    }

    /// Population counts over the whole grid
    pub fn census(&self) -> PopulationCounts {
        PopulationCounts::of(&self.cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_codes_roundtrip() {
        for state in [
            CellState::Empty,
            CellState::Healthy,
            CellState::Infected,
            CellState::Dead,
            CellState::DeadPrior,
        ] {
            assert_eq!(CellState::from_code(state.code()), Some(state));
        }
        assert_eq!(CellState::from_code(2), None);
        assert_eq!(CellState::from_code(-4), None);
    }

    #[test]
    fn test_infectious_states() {
        assert!(!CellState::Empty.is_infectious());
        assert!(!CellState::Healthy.is_infectious());
        assert!(CellState::Infected.is_infectious());
        assert!(CellState::Dead.is_infectious());
        assert!(CellState::DeadPrior.is_infectious());
    }

    #[test]
    fn test_grid_rejects_zero_dimensions() {
        assert!(matches!(
            Grid::new(0, 3, vec![]),
            Err(SimulationError::Configuration(_))
        ));
        assert!(matches!(
            Grid::new(3, 0, vec![]),
            Err(SimulationError::Configuration(_))
        ));
    }

    #[test]
    fn test_grid_rejects_wrong_cell_count() {
        let result = Grid::new(2, 2, vec![CellState::Healthy; 3]);
        assert!(matches!(result, Err(SimulationError::Configuration(_))));
    }

    #[test]
    fn test_row_access_and_write() {
        let mut grid = Grid::filled(3, 2, CellState::Healthy).unwrap();
        grid.write_rows(1, &[CellState::Dead, CellState::Infected]);

        assert_eq!(grid.row(0), &[CellState::Healthy, CellState::Healthy]);
        assert_eq!(grid.row(1), &[CellState::Dead, CellState::Infected]);
        assert_eq!(grid.row_range(1, 2).len(), 4);
        assert_eq!(grid.row(1)[1], CellState::Infected);
    }

    #[test]
    fn test_census_counts_every_cell() {
        let cells = vec![
            CellState::Empty,
            CellState::Healthy,
            CellState::Infected,
            CellState::Dead,
            CellState::DeadPrior,
            CellState::Healthy,
        ];
        let grid = Grid::new(2, 3, cells).unwrap();
        let counts = grid.census();

        assert_eq!(counts.healthy, 2);
        assert_eq!(counts.infected, 1);
        assert_eq!(counts.dead_total(), 2);
        assert_eq!(counts.survivors(), 3);
        assert_eq!(counts.total(), 6);
    }

    #[test]
    fn test_counts_sum_in_any_order() {
        let a = PopulationCounts::of(&[CellState::Healthy, CellState::Infected]);
        let b = PopulationCounts::of(&[CellState::Dead]);
        let c = PopulationCounts::of(&[CellState::Empty, CellState::Infected]);

        let forward: PopulationCounts = [a, b, c].into_iter().sum();
        let backward: PopulationCounts = [c, b, a].into_iter().sum();
        assert_eq!(forward, backward);
        assert_eq!(forward, (a + b) + c);
        assert_eq!(forward.infected, 2);
    }
}
