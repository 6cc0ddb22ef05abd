//! Population aggregation and the continuation decision
//!
//! Workers report partial counts for the rows they computed, but the
//! decision is taken from the census of the reassembled grid. Partial counts
//! are only reduced to cross-check the gather.
//!
//! # Example
//!
//! ```
//! use epigrid::engine::aggregate::Aggregator;
//! use epigrid::grid::{CellState, Grid, PopulationCounts};
//!
//! let grid = Grid::filled(2, 2, CellState::Healthy).unwrap();
//! let mut aggregator = Aggregator::new(2);
//! aggregator.add_partition(0, PopulationCounts::of(grid.row(0)));
//! aggregator.add_partition(1, PopulationCounts::of(grid.row(1)));
//!
//! let decision = aggregator.decide(&grid, 1, 10);
//! assert_eq!(decision.counts.healthy, 4);
//! assert!(!decision.proceed);
//! ```

use crate::engine::Termination;
use crate::grid::{Grid, PopulationCounts};

/// Whether the simulation should run another iteration given its counts
#[inline]
pub fn has_active_infection(counts: &PopulationCounts) -> bool {
    counts.infected > 0
}

/// Sum partial counts
///
/// Addition is associative and commutative, so the order and grouping of
/// `parts` does not matter.
pub fn reduce<I>(parts: I) -> PopulationCounts
where
    I: IntoIterator<Item = PopulationCounts>,
{
    parts.into_iter().sum()
}

/// Outcome of the decide phase for one iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    /// Iteration just completed (1-based)
    pub iteration: usize,
    /// Census of the reassembled grid
    pub counts: PopulationCounts,
    /// Broadcast to every worker; `false` ends the run
    pub proceed: bool,
}

impl Decision {
    /// Why the run stops, or `None` if it proceeds
    pub fn termination(&self) -> Option<Termination> {
        if self.proceed {
            None
        } else if has_active_infection(&self.counts) {
            Some(Termination::IterationCap)
        } else {
            Some(Termination::Extinct)
        }
    }
}

/// Collects per-partition counts for one iteration
#[derive(Debug)]
pub struct Aggregator {
    partials: Vec<Option<PopulationCounts>>,
}

impl Aggregator {
    pub fn new(workers: usize) -> Self {
        Self {
            partials: vec![None; workers],
        }
    }

    /// Record the counts a worker reported for its rows
    pub fn add_partition(&mut self, worker: usize, counts: PopulationCounts) {
        self.partials[worker] = Some(counts);
    }

    /// Number of partitions reported so far
    pub fn reported(&self) -> usize {
        self.partials.iter().filter(|p| p.is_some()).count()
    }

    pub fn has_reported(&self, worker: usize) -> bool {
        self.partials.get(worker).is_some_and(|p| p.is_some())
    }

    /// Lowest worker id that has not reported yet
    pub fn first_missing(&self) -> Option<usize> {
        self.partials.iter().position(|p| p.is_none())
    }

    /// Sum of the reported partial counts
    pub fn partial_total(&self) -> PopulationCounts {
        reduce(self.partials.iter().flatten().copied())
    }

    /// Compute the global counts and decide whether to continue
    ///
    /// Counts come from `grid`, the reassembled state after `iteration`.
    /// The run proceeds only while infection is active and `iteration` is
    /// below `cap`.
    pub fn decide(&self, grid: &Grid, iteration: usize, cap: usize) -> Decision {
        let counts = grid.census();
        debug_assert!(
            self.reported() < self.partials.len() || self.partial_total() == counts,
            "partial counts disagree with reassembled grid"
        );

        Decision {
            iteration,
            counts,
            proceed: has_active_infection(&counts) && iteration < cap,
        }
    }

    /// Forget the partial counts before the next iteration
    pub fn reset(&mut self) {
        self.partials.iter_mut().for_each(|p| *p = None);
    }
}
