//! Engine error types
//!
//! Configuration, partitioning and communication failures are fatal to the
//! whole run. Reaching the iteration cap is not an error; it is reported as
//! [`Termination::IterationCap`](crate::engine::Termination::IterationCap).

use crate::engine::Phase;
use thiserror::Error;

/// Fatal simulation failure
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Missing or invalid grid dimensions, or an unusable run configuration
    #[error("configuration error: {0}")]
    Configuration(String),

    /// No valid row mapping could be produced
    #[error("cannot partition {rows} rows across {workers} workers")]
    Partition { rows: usize, workers: usize },

    /// A distribute, exchange, gather or broadcast step did not complete
    #[error("communication failure during {phase} (worker {worker}): {detail}")]
    Communication {
        phase: Phase,
        worker: usize,
        detail: String,
    },

    /// A worker thread panicked before reporting its result
    #[error("worker {worker} panicked")]
    WorkerPanicked { worker: usize },
}

impl SimulationError {
    pub(crate) fn communication(phase: Phase, worker: usize, detail: impl Into<String>) -> Self {
        SimulationError::Communication {
            phase,
            worker,
            detail: detail.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_communication_message_names_phase_and_worker() {
        let err = SimulationError::communication(Phase::Exchange, 3, "channel closed");
        assert_eq!(
            err.to_string(),
            "communication failure during exchange (worker 3): channel closed"
        );
    }

    #[test]
    fn test_partition_message() {
        let err = SimulationError::Partition { rows: 4, workers: 0 };
        assert_eq!(err.to_string(), "cannot partition 4 rows across 0 workers");
    }
}
