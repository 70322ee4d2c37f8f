//! thread pool

use crate::err::{PoolError, Result};
use crate::queue::SyncQueue;
use log::{debug, error};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// A fixed-size worker thread pool.
///
/// `new` spawns the requested number of worker threads; each worker pulls
/// jobs from a shared FIFO queue and runs them. [`submit`](ThreadPool::submit)
/// hands back a [`TaskHandle`] that the caller can block on for the task's
/// outcome. The pool shuts down in one of two modes:
/// [`stop`](ThreadPool::stop) drains the queue first, while
/// [`kill`](ThreadPool::kill) discards whatever is still queued. Dropping the
/// pool stops it and joins every worker.
///
/// Example
///
/// ```rust
/// use workpool::ThreadPool;
///
/// let pool = ThreadPool::new(4).unwrap();
/// let handle = pool.submit(|| 2 + 3).unwrap();
/// assert_eq!(handle.wait().unwrap(), 5);
/// ```
pub struct ThreadPool {
    workers: Vec<Worker>,
    shared: Arc<PoolShared>,
    threads: usize,
}

/// State shared between the pool handle and its workers.
///
/// The `stop`/`kill` flags latch one way only. Workers read them without the
/// lock, but every store happens while `lock` is held so a worker between
/// its predicate check and its wait cannot miss the notification.
struct PoolShared {
    queue: SyncQueue<Job>,
    lock: Mutex<()>,
    cond: Condvar,
    stop: AtomicBool,
    kill: AtomicBool,
}

impl PoolShared {
    fn stopping(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    fn killing(&self) -> bool {
        self.kill.load(Ordering::SeqCst)
    }
}

impl ThreadPool {
    /// New pool with exactly `threads` workers.
    ///
    /// Construction is all-or-nothing: if spawning any worker fails, the
    /// workers already started are shut down and joined before the error is
    /// returned. `threads` must be at least 1.
    pub fn new(threads: usize) -> Result<Self> {
        if threads == 0 {
            return Err(PoolError::NoThreads);
        }

        let shared = Arc::new(PoolShared {
            queue: SyncQueue::new(),
            lock: Mutex::new(()),
            cond: Condvar::new(),
            stop: AtomicBool::new(false),
            kill: AtomicBool::new(false),
        });

        let mut workers = Vec::with_capacity(threads);
        for id in 0..threads {
            match Worker::new(id, Arc::clone(&shared)) {
                Ok(worker) => workers.push(worker),
                Err(e) => {
                    {
                        let _guard = shared.lock.lock().unwrap();
                        shared.kill.store(true, Ordering::SeqCst);
                    }
                    shared.cond.notify_all();
                    for worker in &mut workers {
                        if let Some(handle) = worker.thread.take() {
                            let _ = handle.join();
                        }
                    }
                    return Err(e);
                }
            }
        }

        Ok(ThreadPool {
            workers,
            shared,
            threads,
        })
    }

    /// New pool sized to the hardware-reported parallelism, minimum 1.
    pub fn with_default_parallelism() -> Result<Self> {
        ThreadPool::new(num_cpus::get().max(1))
    }

    /// Submit a task and get back a handle to its eventual outcome.
    ///
    /// The task is queued FIFO and runs on whichever worker dequeues it; a
    /// panic inside the task is caught and surfaced through the handle, not
    /// on the worker. Returns [`PoolError::PoolClosed`] once `stop` or
    /// `kill` has been called; the closed check and the enqueue are atomic
    /// with respect to concurrent shutdown.
    pub fn submit<F, T>(&self, task: F) -> Result<TaskHandle<T>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let job: Job = Box::new(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(task));
            // the caller may have dropped its handle without reading it
            let _ = tx.send(outcome);
        });

        {
            let _guard = self.shared.lock.lock().unwrap();
            if self.shared.stopping() || self.shared.killing() {
                return Err(PoolError::PoolClosed);
            }
            self.shared.queue.push(job);
        }
        self.shared.cond.notify_one();

        Ok(TaskHandle { outcome: rx })
    }

    /// Stop accepting work and drain the queue.
    ///
    /// Every task enqueued before this call returns is still executed;
    /// workers exit once the queue is empty. Calling it again has no
    /// further effect.
    pub fn stop(&self) {
        {
            let _guard = self.shared.lock.lock().unwrap();
            self.shared.stop.store(true, Ordering::SeqCst);
        }
        self.shared.cond.notify_all();
    }

    /// Stop accepting work and discard everything still queued.
    ///
    /// Workers exit as soon as they observe the flag. A task already being
    /// executed runs to completion; tasks never dequeued are dropped before
    /// this call returns, and waiting on their handles yields
    /// [`PoolError::PoolClosed`]. Kill wins over a concurrent or earlier
    /// `stop`.
    pub fn kill(&self) {
        {
            let _guard = self.shared.lock.lock().unwrap();
            self.shared.kill.store(true, Ordering::SeqCst);
            // dropping the discarded jobs drops their result senders, so a
            // caller already waiting on a handle observes the shutdown
            while self.shared.queue.try_pop().is_some() {}
        }
        self.shared.cond.notify_all();
    }

    /// Number of worker threads, fixed at construction.
    pub fn size(&self) -> usize {
        self.threads
    }

    /// Whether the pool still accepts new tasks.
    pub fn running(&self) -> bool {
        !self.shared.stopping() && !self.shared.killing()
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.stop();
        for worker in &mut self.workers {
            debug!("worker-{} joining", worker.id);
            if let Some(handle) = worker.thread.take() {
                if handle.join().is_err() {
                    error!("worker-{} exited with a panic", worker.id);
                }
            }
        }
    }
}

/// The receiving end of one task's result channel.
///
/// Exactly one worker writes the outcome, exactly once; this handle reads it,
/// exactly once. Dropping the handle without reading silently discards the
/// outcome, including any failure signal from the task.
pub struct TaskHandle<T> {
    outcome: mpsc::Receiver<thread::Result<T>>,
}

impl<T> TaskHandle<T> {
    /// Block until the task finishes and return its outcome.
    ///
    /// A panic inside the task comes back as
    /// [`PoolError::TaskPanicked`]. If the pool was killed before the task
    /// ever ran, the result is [`PoolError::PoolClosed`].
    pub fn wait(self) -> Result<T> {
        match self.outcome.recv() {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(payload)) => Err(PoolError::TaskPanicked(panic_message(payload.as_ref()))),
            Err(_) => Err(PoolError::PoolClosed),
        }
    }

    /// Poll for the outcome without blocking.
    ///
    /// Returns the handle back in `Err` while the task is still pending.
    pub fn try_wait(self) -> std::result::Result<Result<T>, TaskHandle<T>> {
        match self.outcome.try_recv() {
            Ok(Ok(value)) => Ok(Ok(value)),
            Ok(Err(payload)) => Ok(Err(PoolError::TaskPanicked(panic_message(payload.as_ref())))),
            Err(mpsc::TryRecvError::Empty) => Err(self),
            Err(mpsc::TryRecvError::Disconnected) => Ok(Err(PoolError::PoolClosed)),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_owned()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

struct Worker {
    id: usize,
    thread: Option<JoinHandle<()>>,
}

impl Worker {
    fn new(id: usize, shared: Arc<PoolShared>) -> Result<Self> {
        let handle = thread::Builder::new()
            .name(format!("workpool-worker-{}", id))
            .spawn(move || run_worker(id, shared))?;
        Ok(Worker {
            id,
            thread: Some(handle),
        })
    }
}

/// Worker loop. On every wake: kill beats everything, stop terminates only
/// once the queue is drained, otherwise claim the head job and run it
/// outside the lock.
fn run_worker(id: usize, shared: Arc<PoolShared>) {
    loop {
        let job = {
            let mut guard = shared.lock.lock().unwrap();
            loop {
                if shared.killing() {
                    debug!("worker-{} killed", id);
                    return;
                }
                if !shared.queue.is_empty() {
                    break;
                }
                if shared.stopping() {
                    debug!("worker-{} drained; shutting down", id);
                    return;
                }
                guard = shared.cond.wait(guard).unwrap();
            }
            // still under the pool lock, so exactly one worker claims it
            shared.queue.try_pop()
        };

        if let Some(job) = job {
            if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                error!("worker-{} task panicked", id);
            }
        }
    }
}
