//! # Deferred Task Queue
//!
//! Work submitted from any thread and executed on the loop thread.
//!
//! ## Drain Semantics
//!
//! ```text
//!  post(a) post(b)        drain #1             post(c) inside b
//!  ────────────────┬──────────────────────┬──────────────────────
//!  pending: [a, b] │ swap → batch [a, b]  │ pending: [c]
//!                  │ run a, run b         │ drain #2 runs c
//! ```
//!
//! The pending vector is swapped out under the lock, so the snapshot a drain
//! executes is exactly what was posted before it started. Tasks posted while
//! the batch runs land in the fresh pending vector and wait for the next
//! drain. The lock is never held while a task runs.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

/// A deferred unit of work.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Multi-producer, single-drainer FIFO of [`Task`]s.
pub struct TaskQueue {
    /// Tasks posted since the last drain.
    pending: Mutex<Vec<Task>>,
    /// Reusable batch buffer, parked here between drains.
    spare: Mutex<Vec<Task>>,
    /// Tasks executed over the queue's lifetime.
    executed: AtomicU64,
}

impl TaskQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty queue with room for `capacity` tasks per frame
    /// before reallocating.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: Mutex::new(Vec::with_capacity(capacity)),
            spare: Mutex::new(Vec::with_capacity(capacity)),
            executed: AtomicU64::new(0),
        }
    }

    /// Enqueues a task for the next drain. Safe from any thread.
    #[inline]
    pub fn post<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.post_boxed(Box::new(task));
    }

    /// Enqueues an already boxed task.
    #[inline]
    pub fn post_boxed(&self, task: Task) {
        self.pending.lock().push(task);
    }

    /// Number of tasks waiting for the next drain.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.lock().len()
    }

    /// Total tasks executed by [`drain`](Self::drain) so far.
    #[must_use]
    pub fn executed(&self) -> u64 {
        self.executed.load(Ordering::Relaxed)
    }

    /// Runs every task posted before this call, in submission order.
    ///
    /// Returns the number of tasks executed. If a task panics, the rest of
    /// the batch is dropped unexecuted and the panic propagates.
    pub fn drain(&self) -> usize {
        let mut batch = std::mem::take(&mut *self.spare.lock());
        std::mem::swap(&mut *self.pending.lock(), &mut batch);

        let count = batch.len();
        if count == 0 {
            *self.spare.lock() = batch;
            return 0;
        }

        for task in batch.drain(..) {
            task();
            self.executed.fetch_add(1, Ordering::Relaxed);
        }

        *self.spare.lock() = batch;
        count
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskQueue")
            .field("pending", &self.pending())
            .field("executed", &self.executed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    #[test]
    fn test_drain_runs_in_submission_order() {
        let queue = TaskQueue::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        for i in 0..5 {
            let log = Arc::clone(&log);
            queue.post(move || log.lock().push(i));
        }

        assert_eq!(queue.pending(), 5);
        assert_eq!(queue.drain(), 5);
        assert_eq!(*log.lock(), vec![0, 1, 2, 3, 4]);

        // Nothing is executed twice.
        assert_eq!(queue.drain(), 0);
        assert_eq!(log.lock().len(), 5);
        assert_eq!(queue.executed(), 5);
    }

    #[test]
    fn test_task_posted_during_drain_waits_for_next_drain() {
        let queue = Arc::new(TaskQueue::new());
        let log = Arc::new(Mutex::new(Vec::new()));

        {
            let inner_queue = Arc::clone(&queue);
            let log = Arc::clone(&log);
            queue.post(move || {
                log.lock().push("outer");
                let log = Arc::clone(&log);
                inner_queue.post(move || log.lock().push("inner"));
            });
        }

        assert_eq!(queue.drain(), 1);
        assert_eq!(*log.lock(), vec!["outer"]);
        assert_eq!(queue.pending(), 1);

        assert_eq!(queue.drain(), 1);
        assert_eq!(*log.lock(), vec!["outer", "inner"]);
    }

    #[test]
    fn test_drain_on_empty_queue() {
        let queue = TaskQueue::with_capacity(16);
        assert_eq!(queue.drain(), 0);
        assert_eq!(queue.executed(), 0);
    }

    #[test]
    fn test_concurrent_producers_lose_nothing() {
        const PRODUCERS: usize = 8;
        const PER_PRODUCER: usize = 500;

        let queue = Arc::new(TaskQueue::new());
        let counter = Arc::new(AtomicUsize::new(0));

        let producers: Vec<_> = (0..PRODUCERS)
            .map(|_| {
                let queue = Arc::clone(&queue);
                let counter = Arc::clone(&counter);
                std::thread::spawn(move || {
                    for _ in 0..PER_PRODUCER {
                        let counter = Arc::clone(&counter);
                        queue.post(move || {
                            counter.fetch_add(1, Ordering::SeqCst);
                        });
                    }
                })
            })
            .collect();

        let mut drained = 0;
        while drained < PRODUCERS * PER_PRODUCER {
            drained += queue.drain();
            std::thread::yield_now();
        }
        for producer in producers {
            producer.join().unwrap();
        }

        assert_eq!(queue.drain(), 0);
        assert_eq!(counter.load(Ordering::SeqCst), PRODUCERS * PER_PRODUCER);
    }

    #[test]
    fn test_nested_drain_does_not_deadlock() {
        let queue = Arc::new(TaskQueue::new());
        let inner = Arc::clone(&queue);
        let ran = Arc::new(AtomicUsize::new(0));

        let ran_outer = Arc::clone(&ran);
        queue.post(move || {
            ran_outer.fetch_add(1, Ordering::SeqCst);
            assert_eq!(inner.drain(), 0);
        });

        assert_eq!(queue.drain(), 1);
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }
}
