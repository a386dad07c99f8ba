//! Bounded, order-preserving parallel map over documents.
//!
//! Work is spread across a fixed-size `rayon` pool. Each worker thread gets
//! its own state from an init closure (no sharing, no locks), and every
//! result is written back into the slot of its input index, so callers see
//! input order no matter which worker finishes first.
//!
//! # Examples
//!
//! ```
//! use complaint_loss::parallel::WorkerPool;
//!
//! let pool = WorkerPool::new(Some(4)).expect("pool starts");
//! let docs = vec!["a", "bb", "ccc"];
//! let lens = pool.ordered_map(&docs, || 0usize, |_, doc| doc.len());
//! assert_eq!(lens, vec![1, 2, 3]);
//! ```

use crate::error::{ComplaintError, Result};
use rayon::prelude::*;
use std::num::NonZeroUsize;

/// Fixed-size worker pool.
#[derive(Debug)]
pub struct WorkerPool {
    pool: rayon::ThreadPool,
    workers: usize,
}

impl WorkerPool {
    /// Start a pool with `workers` threads, or one per available CPU.
    ///
    /// # Errors
    ///
    /// Returns an error for `Some(0)` or when the threads cannot be spawned.
    pub fn new(workers: Option<usize>) -> Result<Self> {
        let workers = match workers {
            Some(0) => {
                return Err(ComplaintError::invalid_hyperparameter(
                    "workers",
                    0,
                    "at least 1",
                ))
            }
            Some(n) => n,
            None => Self::available(),
        };

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("normalize-{i}"))
            .build()
            .map_err(|e| ComplaintError::ThreadPool(e.to_string()))?;

        tracing::debug!(workers, "started worker pool");
        Ok(Self { pool, workers })
    }

    /// Number of CPUs visible to this process (at least 1).
    #[must_use]
    pub fn available() -> usize {
        std::thread::available_parallelism().map_or(1, NonZeroUsize::get)
    }

    /// Number of worker threads.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Map `f` over `items` in parallel and return results in input order.
    ///
    /// `init` runs once per worker split to build that worker's private
    /// state; `f` receives it mutably alongside each item.
    pub fn ordered_map<T, S, R, I, F>(&self, items: &[T], init: I, f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        I: Fn() -> S + Sync + Send,
        F: Fn(&mut S, &T) -> R + Sync + Send,
    {
        let finished: Vec<(usize, R)> = self.pool.install(|| {
            items
                .par_iter()
                .enumerate()
                .map_init(&init, |state, (idx, item)| (idx, f(state, item)))
                .collect()
        });

        let mut slots: Vec<Option<R>> = Vec::with_capacity(items.len());
        slots.resize_with(items.len(), || None);
        for (idx, result) in finished {
            slots[idx] = Some(result);
        }
        slots.into_iter().flatten().collect()
    }
}
