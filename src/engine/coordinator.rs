//! Superstep coordinator
//!
//! The coordinator owns the authoritative grid and drives every iteration
//! through the same five phases:
//!
//! 1. **Distribute**: send each worker its rows
//! 2. **Exchange**: workers swap halo rows among themselves
//! 3. **Compute**: workers step their rows
//! 4. **Gather**: collect every worker's next rows into a fresh grid
//! 5. **Decide**: census the grid and broadcast continue/stop
//!
//! Phases 2 and 3 happen inside the workers; the coordinator waits for them
//! in phase 4.

use crate::engine::aggregate::{Aggregator, Decision};
use crate::engine::halo;
use crate::engine::partition::{PartitionTable, RowRange};
use crate::engine::protocol::{Command, WorkerEvent};
use crate::engine::worker::Worker;
use crate::engine::{EngineConfig, Phase, RunSummary, Termination};
use crate::error::SimulationError;
use crate::grid::{CellState, Grid};
use crossbeam::channel::{unbounded, Receiver, Sender};
use std::thread;
use std::time::Instant;

/// Run the distributed simulation to completion
///
/// Spawns one worker thread per partition, drives supersteps until the
/// infection dies out or the iteration cap is hit, then joins every worker.
/// Any communication failure or worker panic aborts the whole run.
pub fn run_distributed(grid: Grid, config: &EngineConfig) -> Result<RunSummary, SimulationError> {
    let start = Instant::now();
    let table = PartitionTable::new(grid.rows(), config.workers)?;
    let seed = config.resolved_seed();
    let cap = config.iteration_cap(&grid);

    if table.idle_workers() > 0 {
        tracing::warn!(
            "{} of {} workers own no rows ({} rows); they will only forward halo rows",
            table.idle_workers(),
            table.workers(),
            grid.rows()
        );
    }
    tracing::info!(
        rows = grid.rows(),
        cols = grid.cols(),
        workers = table.workers(),
        seed,
        max_iterations = cap,
        "starting distributed simulation"
    );

    let cols = grid.cols();
    let (workers, commands, results) = build_workers(table.ranges(), cols, seed);
    let coordinator = Coordinator {
        table: &table,
        grid,
        cap,
        report_interval: config.report_interval.max(1),
        commands,
        results,
        aggregator: Aggregator::new(table.workers()),
    };
    let (iterations, decision) = supervise(coordinator, workers)?;

    let termination = decision
        .termination()
        .unwrap_or(Termination::IterationCap);

    Ok(RunSummary {
        rows: table.rows(),
        cols,
        workers: table.workers(),
        seed,
        iterations,
        counts: decision.counts,
        elapsed: start.elapsed(),
        termination,
    })
}

/// One worker per range, wired to its row neighbours and to the coordinator
fn build_workers(
    ranges: &[RowRange],
    cols: usize,
    seed: u64,
) -> (Vec<Worker>, Vec<Sender<Command>>, Receiver<WorkerEvent>) {
    let (result_tx, result_rx) = unbounded();
    let mut command_txs = Vec::with_capacity(ranges.len());
    let mut workers = Vec::with_capacity(ranges.len());

    for (links, range) in halo::mesh(ranges.len()).into_iter().zip(ranges) {
        let (cmd_tx, cmd_rx) = unbounded();
        command_txs.push(cmd_tx);
        workers.push(Worker::new(*range, cols, links, seed, cmd_rx, result_tx.clone()));
    }
    // Only workers hold result senders, so losing all of them shows up as a
    // disconnect during gather.
    drop(result_tx);

    (workers, command_txs, result_rx)
}

/// Drive `coordinator` with every worker on its own scoped thread
///
/// Joins all workers before returning. A worker panic outranks the
/// coordinator's own error, which outranks an error a worker hit on its
/// own after the coordinator finished.
fn supervise(
    coordinator: Coordinator<'_>,
    workers: Vec<Worker>,
) -> Result<(usize, Decision), SimulationError> {
    thread::scope(|s| {
        let handles: Vec<_> = workers
            .into_iter()
            .map(|worker| (worker.id(), s.spawn(move || worker.run_supervised())))
            .collect();

        // Dropping the coordinator closes every command channel, which
        // releases workers still blocked on it when the run fails.
        let outcome = coordinator.drive();

        let mut worker_error = None;
        let mut panicked = None;
        for (id, handle) in handles {
            match handle.join() {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => {
                    tracing::warn!(worker = id, error = %e, "worker stopped with error");
                    worker_error.get_or_insert(e);
                }
                Err(_) => {
                    panicked.get_or_insert(id);
                }
            }
        }

        if let Some(worker) = panicked {
            return Err(SimulationError::WorkerPanicked { worker });
        }
        let outcome = outcome?;
        if let Some(e) = worker_error {
            return Err(e);
        }
        Ok(outcome)
    })
}

/// Coordinating role: owns the grid arena and the worker channels
struct Coordinator<'a> {
    table: &'a PartitionTable,
    grid: Grid,
    cap: usize,
    report_interval: usize,
    commands: Vec<Sender<Command>>,
    results: Receiver<WorkerEvent>,
    aggregator: Aggregator,
}

impl Coordinator<'_> {
    /// Loop supersteps; returns the iteration count and the final decision
    fn drive(mut self) -> Result<(usize, Decision), SimulationError> {
        let mut iteration = 0;
        loop {
            iteration += 1;

            self.distribute(iteration)?;
            self.gather(iteration)?;
            let decision = self.decide(iteration);
            self.broadcast(&decision)?;

            if !decision.proceed {
                tracing::info!(
                    iterations = iteration,
                    termination = %decision.termination().unwrap_or(Termination::IterationCap),
                    "simulation finished"
                );
                return Ok((iteration, decision));
            }
        }
    }

    fn distribute(&self, iteration: usize) -> Result<(), SimulationError> {
        tracing::debug!(iteration, phase = %Phase::Distribute, "scattering rows");
        for (worker, range) in self.table.ranges().iter().enumerate() {
            let rows = self.grid.row_range(range.start, range.len).to_vec();
            self.commands[worker]
                .send(Command::Distribute { iteration, rows })
                .map_err(|_| {
                    SimulationError::communication(Phase::Distribute, worker, "worker disconnected")
                })?;
        }
        Ok(())
    }

    /// Collect one result per worker into a replacement grid
    fn gather(&mut self, iteration: usize) -> Result<(), SimulationError> {
        tracing::debug!(iteration, phase = %Phase::Gather, "collecting rows");
        self.aggregator.reset();

        let cols = self.grid.cols();
        let mut next = Grid::filled(self.grid.rows(), cols, CellState::Empty)?;
        for _ in 0..self.table.workers() {
            let event = self.results.recv().map_err(|_| {
                SimulationError::communication(
                    Phase::Gather,
                    self.aggregator.first_missing().unwrap_or(0),
                    "all workers disconnected",
                )
            })?;
            let result = match event {
                WorkerEvent::Completed(result) => result,
                WorkerEvent::Failed { worker, reason } => {
                    return Err(SimulationError::communication(Phase::Gather, worker, reason));
                }
            };
            if self.aggregator.has_reported(result.worker) {
                return Err(SimulationError::communication(
                    Phase::Gather,
                    result.worker,
                    format!("duplicate result for iteration {}", result.iteration),
                ));
            }
            if result.iteration != iteration {
                return Err(SimulationError::communication(
                    Phase::Gather,
                    result.worker,
                    format!("result for iteration {}, expected {}", result.iteration, iteration),
                ));
            }

            let range = self.table.range(result.worker);
            if result.rows.len() != range.len * cols {
                return Err(SimulationError::communication(
                    Phase::Gather,
                    result.worker,
                    format!("returned {} cells, expected {}", result.rows.len(), range.len * cols),
                ));
            }
            next.write_rows(range.start, &result.rows);
            self.aggregator.add_partition(result.worker, result.counts);
        }

        self.grid = next;
        Ok(())
    }

    fn decide(&self, iteration: usize) -> Decision {
        let decision = self.aggregator.decide(&self.grid, iteration, self.cap);
        tracing::debug!(
            iteration,
            phase = %Phase::Decide,
            infected = decision.counts.infected,
            proceed = decision.proceed,
            "decided"
        );
        if iteration == 1 || iteration % self.report_interval == 0 {
            tracing::info!(
                "iteration {}: healthy={}, infected={}, dead={}",
                iteration,
                decision.counts.healthy,
                decision.counts.infected,
                decision.counts.dead_total()
            );
        }
        decision
    }

    fn broadcast(&self, decision: &Decision) -> Result<(), SimulationError> {
        for (worker, tx) in self.commands.iter().enumerate() {
            tx.send(Command::Decision {
                iteration: decision.iteration,
                proceed: decision.proceed,
            })
            .map_err(|_| {
                SimulationError::communication(Phase::Decide, worker, "worker disconnected")
            })?;
        }
        Ok(())
    }
}
