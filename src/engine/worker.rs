//! Partition worker
//!
//! One worker runs per partition, on its own thread, for the whole run.
//! Each superstep it blocks on exactly four things, in order: the rows from
//! the coordinator, both halo rows, delivery of its result, and the
//! continuation decision. Stepping itself never blocks.

use crate::engine::halo::HaloLinks;
use crate::engine::partition::RowRange;
use crate::engine::protocol::{Command, PartitionResult, WorkerEvent};
use crate::engine::stepper::{step_block, worker_rng};
use crate::engine::Phase;
use crate::error::SimulationError;
use crate::grid::{CellState, PopulationCounts};
use crossbeam::channel::{Receiver, Sender};
use rand_xoshiro::Xoshiro256PlusPlus;
use std::panic::{self, AssertUnwindSafe};

/// Worker owning one row range
pub struct Worker {
    id: usize,
    range: RowRange,
    cols: usize,
    links: HaloLinks,
    rng: Xoshiro256PlusPlus,
    commands: Receiver<Command>,
    results: Sender<WorkerEvent>,
}

impl Worker {
    pub fn new(
        range: RowRange,
        cols: usize,
        links: HaloLinks,
        seed: u64,
        commands: Receiver<Command>,
        results: Sender<WorkerEvent>,
    ) -> Self {
        let id = links.worker();
        Self {
            id,
            range,
            cols,
            links,
            rng: worker_rng(seed, id),
            commands,
            results,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Run supersteps, reporting any failure or panic to the coordinator
    ///
    /// This is the entry point for worker threads: whatever stops the
    /// worker, the coordinator hears about it on the result channel.
    pub fn run_supervised(self) -> Result<usize, SimulationError> {
        let id = self.id;
        let alarm = self.results.clone();

        let outcome = match panic::catch_unwind(AssertUnwindSafe(move || self.run())) {
            Ok(outcome) => outcome,
            Err(_) => Err(SimulationError::WorkerPanicked { worker: id }),
        };
        if let Err(ref e) = outcome {
            // The coordinator may already be gone; nothing more to do then
            let _ = alarm.send(WorkerEvent::Failed {
                worker: id,
                reason: e.to_string(),
            });
        }
        outcome
    }

    /// Run supersteps until the coordinator says stop
    ///
    /// Returns the number of iterations this worker took part in.
    pub fn run(mut self) -> Result<usize, SimulationError> {
        tracing::debug!(
            worker = self.id,
            start = self.range.start,
            rows = self.range.len,
            "worker started"
        );

        let mut completed = 0;
        loop {
            let (iteration, rows) = self.receive_rows()?;

            tracing::debug!(
                iteration,
                phase = %Phase::Exchange,
                worker = self.id,
                "exchanging halo rows"
            );
            let halo = self.links.exchange(iteration, self.cols, &rows)?;

            tracing::debug!(
                iteration,
                phase = %Phase::Compute,
                worker = self.id,
                rows = self.range.len,
                "stepping rows"
            );
            let next = step_block(&halo.above, &rows, &halo.below, self.cols, &mut self.rng);
            let counts = PopulationCounts::of(&next);

            self.results
                .send(WorkerEvent::Completed(PartitionResult {
                    worker: self.id,
                    iteration,
                    rows: next,
                    counts,
                }))
                .map_err(|_| {
                    SimulationError::communication(Phase::Gather, self.id, "coordinator disconnected")
                })?;

            completed += 1;
            if !self.receive_decision(iteration)? {
                break;
            }
        }

        tracing::debug!(worker = self.id, iterations = completed, "worker finished");
        Ok(completed)
    }

    fn receive_rows(&self) -> Result<(usize, Vec<CellState>), SimulationError> {
        match self.commands.recv() {
            Ok(Command::Distribute { iteration, rows }) => {
                let expected = self.range.len * self.cols;
                if rows.len() != expected {
                    return Err(SimulationError::communication(
                        Phase::Distribute,
                        self.id,
                        format!("received {} cells, expected {}", rows.len(), expected),
                    ));
                }
                Ok((iteration, rows))
            }
            Ok(other) => Err(SimulationError::communication(
                Phase::Distribute,
                self.id,
                format!("expected rows, got {:?}", other),
            )),
            Err(_) => Err(SimulationError::communication(
                Phase::Distribute,
                self.id,
                "coordinator disconnected",
            )),
        }
    }

    fn receive_decision(&self, iteration: usize) -> Result<bool, SimulationError> {
        match self.commands.recv() {
            Ok(Command::Decision { iteration: decided, proceed }) if decided == iteration => {
                Ok(proceed)
            }
            Ok(other) => Err(SimulationError::communication(
                Phase::Decide,
                self.id,
                format!("expected decision for iteration {}, got {:?}", iteration, other),
            )),
            Err(_) => Err(SimulationError::communication(
                Phase::Decide,
                self.id,
                "coordinator disconnected",
            )),
        }
    }
}
