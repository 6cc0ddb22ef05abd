//! Local transition rule
//!
//! Computes the next state of a block of rows given the halo rows around
//! it. The block is never modified in place and the halo rows are only
//! read, so the result depends on the previous state alone.
//!
//! Infected cells resolve by a uniform draw in `[0, 10000)`:
//!
//! | draw          | next      |
//! |---------------|-----------|
//! | `< 1000`      | Healthy   |
//! | `1000..4000`  | Infected  |
//! | `>= 4000`     | Dead      |
//!
//! Draws are taken in row-major order, one per infected cell, so a block
//! stepped with a given generator always produces the same result.

use crate::grid::CellState;
use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Exclusive upper bound of the infection draw
pub const DRAW_RANGE: u32 = 10_000;

/// Draws below this recover
pub const RECOVER_BELOW: u32 = 1_000;

/// Draws below this (and not recovering) stay infected; the rest die
pub const REMAIN_INFECTED_BELOW: u32 = 4_000;

/// Random stream for one worker
///
/// Workers get distinct streams by offsetting the run seed with their id.
/// Worker 0 uses the run seed itself, which is also what the sequential
/// reference uses.
pub fn worker_rng(seed: u64, worker: usize) -> Xoshiro256PlusPlus {
    Xoshiro256PlusPlus::seed_from_u64(seed.wrapping_add(worker as u64))
}

/// Outcome of an infected cell for a given draw
#[inline]
pub fn resolve_infected(draw: u32) -> CellState {
    if draw < RECOVER_BELOW {
        CellState::Healthy
    } else if draw < REMAIN_INFECTED_BELOW {
        CellState::Infected
    } else {
        CellState::Dead
    }
}

/// Next state of a single cell
///
/// `exposed` reports whether any von Neumann neighbour is infectious; it is
/// only consulted for healthy cells.
#[inline]
pub fn next_state<R, F>(current: CellState, exposed: F, rng: &mut R) -> CellState
where
    R: Rng + ?Sized,
    F: FnOnce() -> bool,
{
    match current {
        CellState::Empty => CellState::Empty,
        CellState::Healthy => {
            if exposed() {
                CellState::Infected
            } else {
                CellState::Healthy
            }
        }
        CellState::Infected => resolve_infected(rng.gen_range(0..DRAW_RANGE)),
        CellState::Dead => CellState::DeadPrior,
        CellState::DeadPrior => CellState::Empty,
    }
}

/// Step a block of rows
///
/// `rows` is the block flattened row-major with `cols` cells per row.
/// `above` and `below` are the neighbouring rows outside the block; at a
/// grid boundary they are all `Empty`. Columns never wrap.
///
/// Returns the next state of the block's own rows only.
pub fn step_block<R: Rng + ?Sized>(
    above: &[CellState],
    rows: &[CellState],
    below: &[CellState],
    cols: usize,
    rng: &mut R,
) -> Vec<CellState> {
    if rows.is_empty() {
        return Vec::new();
    }
    debug_assert_eq!(rows.len() % cols, 0);
    debug_assert_eq!(above.len(), cols);
    debug_assert_eq!(below.len(), cols);

    let height = rows.len() / cols;
    let mut next = Vec::with_capacity(rows.len());

    for r in 0..height {
        let up = if r == 0 {
            above
        } else {
            &rows[(r - 1) * cols..r * cols]
        };
        let down = if r + 1 == height {
            below
        } else {
            &rows[(r + 1) * cols..(r + 2) * cols]
        };
        let row = &rows[r * cols..(r + 1) * cols];

        for c in 0..cols {
            let exposed = || {
                up[c].is_infectious()
                    || down[c].is_infectious()
                    || (c > 0 && row[c - 1].is_infectious())
                    || (c + 1 < cols && row[c + 1].is_infectious())
            };
            next.push(next_state(row[c], exposed, rng));
        }
    }

    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::CellState::{Dead, DeadPrior, Empty, Healthy, Infected};
    use std::collections::HashMap;

    fn empty_row(cols: usize) -> Vec<CellState> {
        vec![Empty; cols]
    }

    #[test]
    fn test_probability_band_thresholds() {
        assert_eq!(resolve_infected(0), Healthy);
        assert_eq!(resolve_infected(999), Healthy);
        assert_eq!(resolve_infected(1000), Infected);
        assert_eq!(resolve_infected(3999), Infected);
        assert_eq!(resolve_infected(4000), Dead);
        assert_eq!(resolve_infected(9999), Dead);
    }

    #[test]
    fn test_deterministic_transitions() {
        let mut rng = worker_rng(1, 0);
        assert_eq!(next_state(Empty, || true, &mut rng), Empty);
        assert_eq!(next_state(Healthy, || true, &mut rng), Infected);
        assert_eq!(next_state(Healthy, || false, &mut rng), Healthy);
        assert_eq!(next_state(Dead, || true, &mut rng), DeadPrior);
        assert_eq!(next_state(DeadPrior, || true, &mut rng), Empty);
    }

    #[test]
    fn test_dead_and_dead_prior_infect_neighbours() {
        let mut rng = worker_rng(1, 0);
        let rows = vec![Healthy, Dead, Healthy, DeadPrior];
        let next = step_block(&empty_row(4), &rows, &empty_row(4), 4, &mut rng);
        assert_eq!(next, vec![Infected, DeadPrior, Infected, Empty]);
    }

    #[test]
    fn test_center_infection_spreads_to_edges_only() {
        let mut rows = vec![Healthy; 9];
        rows[4] = Infected;
        let mut rng = worker_rng(99, 0);
        let next = step_block(&empty_row(3), &rows, &empty_row(3), 3, &mut rng);

        for corner in [0, 2, 6, 8] {
            assert_eq!(next[corner], Healthy);
        }
        for edge in [1, 3, 5, 7] {
            assert_eq!(next[edge], Infected);
        }
        assert!(matches!(next[4], Healthy | Infected | Dead));
    }

    #[test]
    fn test_columns_do_not_wrap() {
        let mut rng = worker_rng(5, 0);
        let rows = vec![Healthy, Healthy, Healthy, Dead];
        let next = step_block(&empty_row(4), &rows, &empty_row(4), 4, &mut rng);
        assert_eq!(next[0], Healthy);
        assert_eq!(next[2], Infected);
    }

    #[test]
    fn test_halo_rows_are_context_only() {
        let mut rng = worker_rng(5, 0);
        let above = vec![Dead, Healthy];
        let below = vec![Healthy, Infected];
        let rows = vec![Healthy, Healthy];
        let next = step_block(&above, &rows, &below, 2, &mut rng);

        assert_eq!(next, vec![Infected, Infected]);
        assert_eq!(above, vec![Dead, Healthy]);
        assert_eq!(below, vec![Healthy, Infected]);
    }

    #[test]
    fn test_empty_block() {
        let mut rng = worker_rng(5, 0);
        assert!(step_block(&empty_row(3), &[], &empty_row(3), 3, &mut rng).is_empty());
    }

    #[test]
    fn test_same_seed_same_result() {
        let rows = vec![Infected; 64];
        let a = step_block(&empty_row(8), &rows, &empty_row(8), 8, &mut worker_rng(11, 2));
        let b = step_block(&empty_row(8), &rows, &empty_row(8), 8, &mut worker_rng(11, 2));
        assert_eq!(a, b);
    }

    #[test]
    fn test_infected_outcome_distribution() {
        let mut rng = worker_rng(2024, 0);
        let mut outcomes: HashMap<CellState, u32> = HashMap::new();
        for _ in 0..20_000 {
            *outcomes.entry(next_state(Infected, || false, &mut rng)).or_default() += 1;
        }

        // 10% / 30% / 60% with generous tolerance
        let healthy = outcomes.get(&Healthy).copied().unwrap_or(0);
        let infected = outcomes.get(&Infected).copied().unwrap_or(0);
        let dead = outcomes.get(&Dead).copied().unwrap_or(0);
        assert!(healthy > 1600 && healthy < 2400, "healthy = {}", healthy);
        assert!(infected > 5400 && infected < 6600, "infected = {}", infected);
        assert!(dead > 11200 && dead < 12800, "dead = {}", dead);
    }
}
