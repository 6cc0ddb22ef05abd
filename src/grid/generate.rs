//! Random input grid generation
//!
//! Produces grids of mostly healthy cells with a few infection seeds, for
//! benchmarking and manual runs. Generation is seeded so the same arguments
//! always produce the same grid.

use super::{CellState, Grid};
use crate::error::SimulationError;
use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Default seed for generated grids
pub const DEFAULT_GENERATE_SEED: u64 = 42;

/// Probability that a generated cell is occupied by a healthy individual
pub const HEALTHY_FRACTION: f64 = 0.8;

/// Generate a `rows × cols` grid
///
/// Each cell is healthy with probability [`HEALTHY_FRACTION`], otherwise
/// empty. Then `infected` positions are picked uniformly and marked
/// infected; positions may repeat, so fewer distinct cells can end up
/// infected.
pub fn generate_grid(
    rows: usize,
    cols: usize,
    infected: usize,
    seed: u64,
) -> Result<Grid, SimulationError> {
    let mut grid = Grid::filled(rows, cols, CellState::Empty)?;
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);

    for row in 0..rows {
        for col in 0..cols {
            if rng.gen_bool(HEALTHY_FRACTION) {
                grid.set(row, col, CellState::Healthy);
            }
        }
    }

    for _ in 0..infected {
        let row = rng.gen_range(0..rows);
        let col = rng.gen_range(0..cols);
        grid.set(row, col, CellState::Infected);
    }

    Ok(grid)
}
