//! Per-phase worker pool.
//!
//! Every numeric phase (kernel build, motion update, sensor update) splits its
//! work into contiguous index ranges and runs one scoped thread per range.
//! Threads are joined before the phase returns, so nothing outlives a phase
//! and no worker ever sees another worker's slice.
//!
//! ```text
//! count = 10, workers = 3
//! ┌───────┬───────┬───────────┐
//! │ 0..3  │ 3..6  │ 6..10     │  remainder goes to the last range
//! └───────┴───────┴───────────┘
//! ```

use std::ops::Range;

/// Worker count used when hardware parallelism cannot be queried.
pub const DEFAULT_WORKERS: usize = 8;

/// Bounded pool of scoped worker threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerPool {
    workers: usize,
}

impl WorkerPool {
    /// Create a pool with a fixed number of workers (at least one).
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    /// Create a pool sized to the available hardware parallelism.
    pub fn from_hardware() -> Self {
        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(DEFAULT_WORKERS);
        Self::new(workers)
    }

    /// Pool for a configured worker count, where 0 means "match hardware".
    pub fn with_workers(workers: usize) -> Self {
        if workers == 0 {
            Self::from_hardware()
        } else {
            Self::new(workers)
        }
    }

    /// Number of workers.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Split `0..count` into contiguous ranges, one per worker.
    ///
    /// Each range has `count / workers` items and the last absorbs the
    /// remainder. When there are fewer items than workers, fewer ranges are
    /// produced so that none is empty (except for `count == 0`, which yields
    /// a single empty range).
    pub fn partition(&self, count: usize) -> Vec<Range<usize>> {
        let workers = self.workers.min(count).max(1);
        let grain = count / workers;

        let mut ranges = Vec::with_capacity(workers);
        let mut start = 0;
        for _ in 0..workers - 1 {
            ranges.push(start..start + grain);
            start += grain;
        }
        ranges.push(start..count);
        ranges
    }

    /// Run `f` over each contiguous chunk of `data` on its own thread.
    ///
    /// `f` receives the chunk's starting offset within `data` and the chunk.
    /// Results are returned in partition order so that reductions over them
    /// are deterministic for a fixed worker count.
    pub fn run_chunks<T, R, F>(&self, data: &mut [T], f: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(usize, &mut [T]) -> R + Sync,
    {
        let ranges = self.partition(data.len());
        if ranges.len() == 1 {
            return vec![f(0, data)];
        }

        std::thread::scope(|scope| {
            let f = &f;
            let mut rest = data;
            let mut handles = Vec::with_capacity(ranges.len());
            for range in &ranges {
                let (chunk, tail) = std::mem::take(&mut rest).split_at_mut(range.len());
                rest = tail;
                let start = range.start;
                handles.push(scope.spawn(move || f(start, chunk)));
            }

            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
                })
                .collect()
        })
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::from_hardware()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_remainder_to_last() {
        let pool = WorkerPool::new(3);
        assert_eq!(pool.partition(10), vec![0..3, 3..6, 6..10]);
    }

    #[test]
    fn test_partition_fewer_items_than_workers() {
        let pool = WorkerPool::new(8);
        assert_eq!(pool.partition(3), vec![0..1, 1..2, 2..3]);
        assert_eq!(pool.partition(0), vec![0..0]);
    }

    #[test]
    fn test_partition_covers_everything() {
        let pool = WorkerPool::new(7);
        let ranges = pool.partition(1000);
        assert_eq!(ranges.len(), 7);
        assert_eq!(ranges.first().map(|r| r.start), Some(0));
        assert_eq!(ranges.last().map(|r| r.end), Some(1000));
        for pair in ranges.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }

    #[test]
    fn test_run_chunks_writes_disjoint_slices() {
        let pool = WorkerPool::new(4);
        let mut data = vec![0usize; 103];
        let sums = pool.run_chunks(&mut data, |start, chunk| {
            for (i, v) in chunk.iter_mut().enumerate() {
                *v = start + i;
            }
            chunk.len()
        });

        assert_eq!(sums.iter().sum::<usize>(), 103);
        for (i, v) in data.iter().enumerate() {
            assert_eq!(*v, i);
        }
    }

    #[test]
    fn test_zero_means_hardware() {
        assert!(WorkerPool::with_workers(0).workers() >= 1);
        assert_eq!(WorkerPool::with_workers(2).workers(), 2);
        assert_eq!(WorkerPool::new(0).workers(), 1);
    }
}
