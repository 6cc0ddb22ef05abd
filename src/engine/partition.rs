//! Static row partitioning
//!
//! Rows are split into contiguous ranges, one per worker, once per run.
//! Every worker gets `rows / workers` rows and the first `rows % workers`
//! workers get one extra. With more workers than rows the trailing workers
//! own zero rows; they still take part in every exchange and simply
//! forward halo rows through.

use crate::error::SimulationError;

/// Contiguous range of grid rows `[start, start + len)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRange {
    pub start: usize,
    pub len: usize,
}

impl RowRange {
    /// One past the last row
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Row range of every worker, indexed by worker id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionTable {
    rows: usize,
    ranges: Vec<RowRange>,
}

impl PartitionTable {
    /// Partition `rows` rows across `workers` workers
    ///
    /// Only `workers == 0` is rejected; any positive worker count yields a
    /// valid table, with zero-length ranges when `workers > rows`.
    pub fn new(rows: usize, workers: usize) -> Result<Self, SimulationError> {
        if workers == 0 {
            return Err(SimulationError::Partition { rows, workers });
        }

        let base = rows / workers;
        let extra = rows % workers;

        let mut ranges = Vec::with_capacity(workers);
        let mut offset = 0;
        for worker in 0..workers {
            let len = base + usize::from(worker < extra);
            ranges.push(RowRange { start: offset, len });
            offset += len;
        }
        debug_assert_eq!(offset, rows);

        Ok(Self { rows, ranges })
    }

    /// Total rows covered
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn workers(&self) -> usize {
        self.ranges.len()
    }

    pub fn range(&self, worker: usize) -> RowRange {
        self.ranges[worker]
    }

    pub fn ranges(&self) -> &[RowRange] {
        &self.ranges
    }

    /// Workers that own no rows
    pub fn idle_workers(&self) -> usize {
        self.ranges.iter().filter(|r| r.is_empty()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_exact_cover(table: &PartitionTable) {
        let mut next = 0;
        for range in table.ranges() {
            assert_eq!(range.start, next, "gap or overlap at row {}", next);
            next = range.end();
        }
        assert_eq!(next, table.rows());
        let total: usize = table.ranges().iter().map(|r| r.len).sum();
        assert_eq!(total, table.rows());
    }

    #[test]
    fn test_even_split() {
        let table = PartitionTable::new(12, 4).unwrap();
        assert!(table.ranges().iter().all(|r| r.len == 3));
        assert_exact_cover(&table);
    }

    #[test]
    fn test_remainder_goes_to_first_workers() {
        let table = PartitionTable::new(10, 4).unwrap();
        let lens: Vec<usize> = table.ranges().iter().map(|r| r.len).collect();
        assert_eq!(lens, vec![3, 3, 2, 2]);
        assert_eq!(table.range(2).start, 6);
        assert_exact_cover(&table);
    }

    #[test]
    fn test_more_workers_than_rows() {
        let table = PartitionTable::new(3, 5).unwrap();
        let lens: Vec<usize> = table.ranges().iter().map(|r| r.len).collect();
        assert_eq!(lens, vec![1, 1, 1, 0, 0]);
        assert_eq!(table.idle_workers(), 2);
        assert_eq!(table.range(4).start, 3);
        assert_exact_cover(&table);
    }

    #[test]
    fn test_zero_workers_rejected() {
        assert!(matches!(
            PartitionTable::new(5, 0),
            Err(SimulationError::Partition { rows: 5, workers: 0 })
        ));
    }

    #[test]
    fn test_cover_for_many_shapes() {
        for rows in 1..40 {
            for workers in 1..12 {
                let table = PartitionTable::new(rows, workers).unwrap();
                assert_eq!(table.workers(), workers);
                assert_exact_cover(&table);
                let max = table.ranges().iter().map(|r| r.len).max().unwrap();
                let min = table.ranges().iter().map(|r| r.len).min().unwrap();
                assert!(max - min <= 1);
            }
        }
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(PartitionTable::new(17, 6).unwrap(), PartitionTable::new(17, 6).unwrap());
    }
}
