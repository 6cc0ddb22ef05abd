//! Sequential reference simulation
//!
//! Runs the same rule over the whole grid on the calling thread, with a
//! single random stream. Given the same seed it reproduces the distributed
//! engine run with one worker exactly, which makes it the yardstick for the
//! distributed path.

use crate::engine::aggregate::has_active_infection;
use crate::engine::stepper::{step_block, worker_rng};
use crate::engine::{EngineConfig, RunSummary, Termination};
use crate::error::SimulationError;
use crate::grid::{CellState, Grid};
use std::time::Instant;

/// Run the simulation sequentially to completion
pub fn run_sequential(mut grid: Grid, config: &EngineConfig) -> Result<RunSummary, SimulationError> {
    let start = Instant::now();
    let seed = config.resolved_seed();
    let cap = config.iteration_cap(&grid);
    let report_interval = config.report_interval.max(1);
    let mut rng = worker_rng(seed, 0);

    tracing::info!(
        rows = grid.rows(),
        cols = grid.cols(),
        seed,
        max_iterations = cap,
        "starting sequential simulation"
    );

    let boundary = vec![CellState::Empty; grid.cols()];
    let mut iteration = 0;
    loop {
        let next = step_block(&boundary, grid.cells(), &boundary, grid.cols(), &mut rng);
        grid = Grid::new(grid.rows(), grid.cols(), next)?;
        iteration += 1;

        let counts = grid.census();
        if iteration == 1 || iteration % report_interval == 0 {
            tracing::info!(
                "iteration {}: healthy={}, infected={}, dead={}",
                iteration,
                counts.healthy,
                counts.infected,
                counts.dead_total()
            );
        }

        if !has_active_infection(&counts) || iteration >= cap {
            let termination = if has_active_infection(&counts) {
                Termination::IterationCap
            } else {
                Termination::Extinct
            };
            tracing::info!(iterations = iteration, termination = %termination, "simulation finished");

            return Ok(RunSummary {
                rows: grid.rows(),
                cols: grid.cols(),
                workers: 1,
                seed,
                iterations: iteration,
                counts,
                elapsed: start.elapsed(),
                termination,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::run_distributed;
    use crate::grid::generate::generate_grid;
    use crate::grid::CellState::{Dead, DeadPrior, Empty, Healthy, Infected};

    fn seeded(seed: u64) -> EngineConfig {
        EngineConfig {
            seed: Some(seed),
            ..Default::default()
        }
    }

    #[test]
    fn test_matches_distributed_single_worker() {
        for seed in [1, 17, 4242] {
            let grid = generate_grid(12, 10, 4, seed).unwrap();
            let sequential = run_sequential(grid.clone(), &seeded(seed)).unwrap();
            let distributed = run_distributed(grid, &seeded(seed)).unwrap();

            assert_eq!(sequential.iterations, distributed.iterations);
            assert_eq!(sequential.counts, distributed.counts);
            assert_eq!(sequential.termination, distributed.termination);
        }
    }

    #[test]
    fn test_dead_cell_decays_to_empty() {
        let mut rng = worker_rng(0, 0);
        let boundary = vec![Empty];
        let mut cells = vec![Dead];
        let mut history = Vec::new();
        for _ in 0..4 {
            cells = step_block(&boundary, &cells, &boundary, 1, &mut rng);
            history.push(cells[0]);
        }
        assert_eq!(history, vec![DeadPrior, Empty, Empty, Empty]);
    }

    #[test]
    fn test_no_infection_single_iteration() {
        let grid = Grid::filled(3, 3, Healthy).unwrap();
        let summary = run_sequential(grid, &seeded(3)).unwrap();
        assert_eq!(summary.iterations, 1);
        assert_eq!(summary.termination, Termination::Extinct);
    }

    #[test]
    fn test_never_exceeds_cap() {
        let grid = Grid::filled(2, 2, Infected).unwrap();
        for seed in 0..20 {
            let summary = run_sequential(grid.clone(), &seeded(seed)).unwrap();
            assert!(summary.iterations <= 4);
            assert_eq!(summary.counts.total(), 4);
            if summary.infected() > 0 {
                assert_eq!(summary.termination, Termination::IterationCap);
                assert_eq!(summary.iterations, 4);
            }
        }
    }
}
