//! Halo row exchange between row-adjacent workers
//!
//! Each worker is linked to the worker above and the worker below by a pair
//! of channels, one per direction:
//!
//! ```text
//!   worker i-1          worker i           worker i+1
//!  [last row] ──────► above halo
//!   below halo ◄────── [first row]
//!                     [last row] ──────► above halo
//!                      below halo ◄────── [first row]
//! ```
//!
//! The first and last worker have no link on their outer side and use an
//! all-`Empty` row instead. Every halo message carries the iteration it
//! belongs to, so a row left over from another iteration is detected rather
//! than silently used.

use crate::engine::Phase;
use crate::error::SimulationError;
use crate::grid::CellState;
use crossbeam::channel::{unbounded, Receiver, Sender};

/// One boundary row in flight between two workers
#[derive(Debug, Clone)]
pub struct HaloMessage {
    pub iteration: usize,
    pub row: Vec<CellState>,
}

/// Read-only neighbour rows for one iteration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Halo {
    pub above: Vec<CellState>,
    pub below: Vec<CellState>,
}

/// Channel endpoints connecting one worker to its row neighbours
#[derive(Debug)]
pub struct HaloLinks {
    worker: usize,
    to_above: Option<Sender<HaloMessage>>,
    from_above: Option<Receiver<HaloMessage>>,
    to_below: Option<Sender<HaloMessage>>,
    from_below: Option<Receiver<HaloMessage>>,
}

/// Build the links for a column of `workers` workers, indexed by worker id
pub fn mesh(workers: usize) -> Vec<HaloLinks> {
    let mut links: Vec<HaloLinks> = (0..workers)
        .map(|worker| HaloLinks {
            worker,
            to_above: None,
            from_above: None,
            to_below: None,
            from_below: None,
        })
        .collect();

    for upper in 1..workers {
        let lower = upper - 1;
        // lower's last row travels down into upper's above halo
        let (down_tx, down_rx) = unbounded();
        // upper's first row travels up into lower's below halo
        let (up_tx, up_rx) = unbounded();

        links[lower].to_below = Some(down_tx);
        links[lower].from_below = Some(up_rx);
        links[upper].from_above = Some(down_rx);
        links[upper].to_above = Some(up_tx);
    }

    links
}

impl HaloLinks {
    pub fn worker(&self) -> usize {
        self.worker
    }

    /// Exchange edge rows with both neighbours for `iteration`
    ///
    /// `rows` holds the worker's own rows, flattened, `cols` cells each.
    /// Returns only once both halo rows have been received, so the caller
    /// never reads a halo that is still in flight.
    ///
    /// A worker that owns no rows forwards what it receives: the row from
    /// below goes up and the row from above goes down, which makes it
    /// transparent to its neighbours.
    pub fn exchange(
        &self,
        iteration: usize,
        cols: usize,
        rows: &[CellState],
    ) -> Result<Halo, SimulationError> {
        if rows.is_empty() {
            let below = self.receive(self.from_below.as_ref(), iteration, cols, "below")?;
            self.send(self.to_above.as_ref(), iteration, &below, "above")?;
            let above = self.receive(self.from_above.as_ref(), iteration, cols, "above")?;
            self.send(self.to_below.as_ref(), iteration, &above, "below")?;
            return Ok(Halo { above, below });
        }

        let first = &rows[..cols];
        let last = &rows[rows.len() - cols..];

        self.send(self.to_above.as_ref(), iteration, first, "above")?;
        self.send(self.to_below.as_ref(), iteration, last, "below")?;

        let above = self.receive(self.from_above.as_ref(), iteration, cols, "above")?;
        let below = self.receive(self.from_below.as_ref(), iteration, cols, "below")?;

        Ok(Halo { above, below })
    }

    fn send(
        &self,
        link: Option<&Sender<HaloMessage>>,
        iteration: usize,
        row: &[CellState],
        side: &str,
    ) -> Result<(), SimulationError> {
        let Some(tx) = link else {
            return Ok(());
        };
        tx.send(HaloMessage {
            iteration,
            row: row.to_vec(),
        })
        .map_err(|_| {
            SimulationError::communication(
                Phase::Exchange,
                self.worker,
                format!("neighbour {} disconnected", side),
            )
        })
    }

    fn receive(
        &self,
        link: Option<&Receiver<HaloMessage>>,
        iteration: usize,
        cols: usize,
        side: &str,
    ) -> Result<Vec<CellState>, SimulationError> {
        let Some(rx) = link else {
            return Ok(vec![CellState::Empty; cols]);
        };
        let msg = rx.recv().map_err(|_| {
            SimulationError::communication(
                Phase::Exchange,
                self.worker,
                format!("neighbour {} disconnected", side),
            )
        })?;
        if msg.iteration != iteration {
            return Err(SimulationError::communication(
                Phase::Exchange,
                self.worker,
                format!(
                    "stale halo from {}: expected iteration {}, got {}",
                    side, iteration, msg.iteration
                ),
            ));
        }
        if msg.row.len() != cols {
            return Err(SimulationError::communication(
                Phase::Exchange,
                self.worker,
                format!("halo from {} has {} cells, expected {}", side, msg.row.len(), cols),
            ));
        }
        Ok(msg.row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    use crate::grid::CellState::{Dead, Empty, Healthy, Infected};

    /// Run one exchange on every worker concurrently
    fn exchange_all(links: Vec<HaloLinks>, blocks: Vec<Vec<CellState>>, cols: usize) -> Vec<Halo> {
        thread::scope(|s| {
            let handles: Vec<_> = links
                .iter()
                .zip(blocks.iter())
                .map(|(link, rows)| s.spawn(move || link.exchange(7, cols, rows).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        })
    }

    #[test]
    fn test_single_worker_gets_empty_halos() {
        let links = mesh(1);
        let halo = links[0].exchange(1, 3, &[Healthy; 6]).unwrap();
        assert_eq!(halo.above, vec![Empty; 3]);
        assert_eq!(halo.below, vec![Empty; 3]);
    }

    #[test]
    fn test_neighbours_receive_edge_rows() {
        let blocks = vec![
            vec![Healthy, Healthy, Infected, Infected],
            vec![Dead, Dead, Healthy, Infected],
            vec![Infected, Healthy],
        ];
        let halos = exchange_all(mesh(3), blocks, 2);

        assert_eq!(halos[0].above, vec![Empty, Empty]);
        assert_eq!(halos[0].below, vec![Dead, Dead]);
        assert_eq!(halos[1].above, vec![Infected, Infected]);
        assert_eq!(halos[1].below, vec![Infected, Healthy]);
        assert_eq!(halos[2].above, vec![Healthy, Infected]);
        assert_eq!(halos[2].below, vec![Empty, Empty]);
    }

    #[test]
    fn test_empty_partition_forwards_rows() {
        let blocks = vec![vec![Infected, Healthy], vec![], vec![Dead, Healthy]];
        let halos = exchange_all(mesh(3), blocks, 2);

        assert_eq!(halos[0].below, vec![Dead, Healthy]);
        assert_eq!(halos[2].above, vec![Infected, Healthy]);
    }

    #[test]
    fn test_trailing_empty_partitions_yield_empty_row() {
        let blocks = vec![vec![Healthy, Infected], vec![], vec![]];
        let halos = exchange_all(mesh(3), blocks, 2);

        assert_eq!(halos[0].below, vec![Empty, Empty]);
    }

    #[test]
    fn test_stale_iteration_detected() {
        let links = mesh(2);
        links[1]
            .send(links[1].to_above.as_ref(), 3, &[Healthy, Healthy], "above")
            .unwrap();

        let err = links[0]
            .receive(links[0].from_below.as_ref(), 4, 2, "below")
            .unwrap_err();
        assert!(matches!(
            err,
            SimulationError::Communication { phase: Phase::Exchange, worker: 0, .. }
        ));
    }

    #[test]
    fn test_disconnected_neighbour_is_communication_failure() {
        let mut links = mesh(2);
        drop(links.pop());

        let err = links[0].exchange(1, 2, &[Healthy, Healthy]).unwrap_err();
        assert!(matches!(err, SimulationError::Communication { .. }));
    }
}
