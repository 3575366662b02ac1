//! Fixed-size worker pool.
//!
//! Tasks are queued on a crossbeam channel and picked up in submission order
//! by a fixed set of threads, so at most `threads` tasks run at once. A
//! panicking task is logged and dropped; the worker keeps serving the queue.

use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};

use crate::error::PoolError;

type Job = Box<dyn FnOnce() + Send + 'static>;

pub struct WorkerPool {
    sender: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

/// Result slot of a task submitted with [`WorkerPool::submit_with_handle`].
pub struct TaskHandle<T> {
    rx: Receiver<T>,
}

impl<T> TaskHandle<T> {
    /// Blocks until the task has produced its value. A task that panicked
    /// yields `PoolError::TaskLost`.
    pub fn join(self) -> Result<T, PoolError> {
        self.rx.recv().map_err(|_| PoolError::TaskLost)
    }
}

impl WorkerPool {
    /// Spawns `threads` workers; zero is treated as one.
    pub fn new(threads: usize) -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded::<Job>();
        let worker_count = threads.max(1);

        let workers = (0..worker_count)
            .map(|id| {
                let rx = receiver.clone();
                thread::spawn(move || {
                    for job in rx {
                        if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                            log::error!("worker {id}: task panicked");
                        }
                    }
                })
            })
            .collect();

        Self {
            sender: Some(sender),
            workers,
        }
    }

    pub fn threads(&self) -> usize {
        self.workers.len()
    }

    pub fn submit<F>(&self, task: F) -> Result<(), PoolError>
    where
        F: FnOnce() + Send + 'static,
    {
        let sender = self.sender.as_ref().ok_or(PoolError::Closed)?;
        sender
            .send(Box::new(task))
            .map_err(|_| PoolError::Closed)
    }

    /// Like [`submit`](Self::submit), returning a handle to the task's value.
    pub fn submit_with_handle<T, F>(&self, task: F) -> Result<TaskHandle<T>, PoolError>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (tx, rx) = crossbeam_channel::bounded(1);
        self.submit(move || {
            // The handle may already be gone; nothing to report then.
            let _ = tx.send(task());
        })?;
        Ok(TaskHandle { rx })
    }

    /// Closes the queue and blocks until every submitted task has finished.
    /// Later submissions fail with `PoolError::Closed`. Calling it again is a
    /// no-op.
    pub fn wait(&mut self) {
        drop(self.sender.take());
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                log::error!("worker thread terminated abnormally");
            }
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.wait();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[test]
    fn test_runs_every_task() {
        let mut pool = WorkerPool::new(4);
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..100 {
            let counter = Arc::clone(&counter);
            pool.submit(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        }
        pool.wait();

        assert_eq!(counter.load(Ordering::SeqCst), 100);
    }

    #[test]
    fn test_zero_threads_means_one() {
        let pool = WorkerPool::new(0);
        assert_eq!(pool.threads(), 1);
    }

    #[test]
    fn test_concurrency_never_exceeds_thread_count() {
        let mut pool = WorkerPool::new(3);
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        for _ in 0..24 {
            let running = Arc::clone(&running);
            let peak = Arc::clone(&peak);
            pool.submit(move || {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                thread::sleep(Duration::from_millis(5));
                running.fetch_sub(1, Ordering::SeqCst);
            })
            .unwrap();
        }
        pool.wait();

        let peak = peak.load(Ordering::SeqCst);
        assert!(peak >= 1 && peak <= 3, "peak concurrency was {peak}");
    }

    #[test]
    fn test_single_thread_runs_in_submission_order() {
        let mut pool = WorkerPool::new(1);
        let order = Arc::new(Mutex::new(Vec::new()));

        for i in 0..10 {
            let order = Arc::clone(&order);
            pool.submit(move || order.lock().unwrap().push(i)).unwrap();
        }
        pool.wait();

        assert_eq!(*order.lock().unwrap(), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_submit_after_wait_is_rejected() {
        let mut pool = WorkerPool::new(2);
        pool.wait();
        pool.wait();

        assert_eq!(pool.submit(|| {}), Err(PoolError::Closed));
        assert!(matches!(
            pool.submit_with_handle(|| 1),
            Err(PoolError::Closed)
        ));
    }

    #[test]
    fn test_handles_return_task_values() {
        let pool = WorkerPool::new(4);
        let handles: Vec<_> = (0..16u64)
            .map(|i| pool.submit_with_handle(move || i * i).unwrap())
            .collect();

        let values: Vec<u64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(values, (0..16u64).map(|i| i * i).collect::<Vec<_>>());
    }

    #[test]
    fn test_panicking_task_does_not_kill_the_pool() {
        let mut pool = WorkerPool::new(1);

        let lost = pool
            .submit_with_handle(|| -> u32 { panic!("bad chunk") })
            .unwrap();
        let after = pool.submit_with_handle(|| 7u32).unwrap();

        assert_eq!(lost.join(), Err(PoolError::TaskLost));
        assert_eq!(after.join(), Ok(7));
        pool.wait();
    }

    #[test]
    fn test_drop_waits_for_queued_tasks() {
        let counter = Arc::new(AtomicUsize::new(0));
        {
            let pool = WorkerPool::new(2);
            for _ in 0..10 {
                let counter = Arc::clone(&counter);
                pool.submit(move || {
                    thread::sleep(Duration::from_millis(1));
                    counter.fetch_add(1, Ordering::SeqCst);
                })
                .unwrap();
            }
        }
        assert_eq!(counter.load(Ordering::SeqCst), 10);
    }
}
