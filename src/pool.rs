//! A minimal fixed-size worker pool satisfying §6.2's contract
//! (`submit(fn) -> future<int>`, `future.wait()`, `nb_threads()`). This
//! exists to satisfy that contract for the parallel batch runner (C8); it
//! is intentionally not a general-purpose scheduler -- the teacher's own
//! `Cargo.toml` already pulled in `rayon` for exactly this kind of fixed
//! worker pool, it just never put it to use.

use crossbeam::channel::{bounded, Receiver};

pub struct FixedPool {
    pool: rayon::ThreadPool,
    nb_threads: usize,
}

/// A handle to a submitted task's eventual result.
pub struct TaskHandle<T> {
    rx: Receiver<T>,
}

impl<T> TaskHandle<T> {
    /// Blocks until the task completes and returns its result.
    ///
    /// # Panics
    /// Panics if the worker thread running the task panicked, since that
    /// indicates a board-contract violation or similar programmer error
    /// that §7 says should not be silently swallowed.
    pub fn wait(self) -> T {
        self.rx
            .recv()
            .expect("worker thread dropped its result sender without sending")
    }
}

impl FixedPool {
    pub fn new(nb_threads: usize) -> Self {
        let nb_threads = nb_threads.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(nb_threads)
            .thread_name(|i| format!("nrpa-worker-{i}"))
            .build()
            .expect("failed to build NRPA worker pool");
        Self { pool, nb_threads }
    }

    pub fn nb_threads(&self) -> usize {
        self.nb_threads
    }

    /// Submits `f` to the pool; no ordering is guaranteed relative to other
    /// submits.
    pub fn submit<T, F>(&self, f: F) -> TaskHandle<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (tx, rx) = bounded(1);
        self.pool.spawn(move || {
            let result = f();
            let _ = tx.send(result);
        });
        TaskHandle { rx }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_and_wait_round_trips_a_value() {
        let pool = FixedPool::new(2);
        let handle = pool.submit(|| 41 + 1);
        assert_eq!(handle.wait(), 42);
    }

    #[test]
    fn nb_threads_reports_construction_size() {
        let pool = FixedPool::new(3);
        assert_eq!(pool.nb_threads(), 3);
    }

    #[test]
    fn batch_of_tasks_all_complete() {
        let pool = FixedPool::new(4);
        let handles: Vec<_> = (0..8).map(|i| pool.submit(move || i * i)).collect();
        let results: Vec<_> = handles.into_iter().map(TaskHandle::wait).collect();
        assert_eq!(results, vec![0, 1, 4, 9, 16, 25, 36, 49]);
    }
}
