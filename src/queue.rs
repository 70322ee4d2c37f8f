//! A FIFO queue safe for concurrent producers and consumers.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

/// `SyncQueue` is an unbounded FIFO queue protected by one mutex and one
/// condition variable.
///
/// Producers call [`push`](SyncQueue::push); consumers take items with the
/// blocking [`wait_pop`](SyncQueue::wait_pop) or the non-blocking
/// [`try_pop`](SyncQueue::try_pop). Every operation holds the internal lock
/// for its whole critical section, so no item is ever handed to two
/// consumers.
///
/// Example
///
/// ```rust
/// use workpool::SyncQueue;
///
/// let queue = SyncQueue::new();
/// queue.push(1);
/// queue.push(2);
/// assert_eq!(queue.wait_pop(), 1);
/// assert_eq!(queue.try_pop(), Some(2));
/// assert!(queue.is_empty());
/// ```
pub struct SyncQueue<T> {
    items: Mutex<VecDeque<T>>,
    cond: Condvar,
}

impl<T> SyncQueue<T> {
    /// New empty queue
    pub fn new() -> Self {
        SyncQueue {
            items: Mutex::new(VecDeque::new()),
            cond: Condvar::new(),
        }
    }

    /// Append an item at the tail and wake one blocked consumer, if any.
    pub fn push(&self, item: T) {
        let mut items = self.items.lock().unwrap();
        items.push_back(item);
        self.cond.notify_one();
    }

    /// Block until the queue is non-empty, then remove and return the head.
    ///
    /// The wait re-checks emptiness in a loop, so a spurious wakeup never
    /// yields a phantom item. There is no timeout; the call returns only
    /// after some producer pushes.
    pub fn wait_pop(&self) -> T {
        let mut items = self.items.lock().unwrap();
        loop {
            match items.pop_front() {
                Some(item) => return item,
                None => items = self.cond.wait(items).unwrap(),
            }
        }
    }

    /// Remove and return the head without blocking, or `None` when empty.
    pub fn try_pop(&self) -> Option<T> {
        self.items.lock().unwrap().pop_front()
    }

    /// Whether the queue holds no items.
    ///
    /// Snapshot only; the answer can be stale as soon as it is returned.
    pub fn is_empty(&self) -> bool {
        self.items.lock().unwrap().is_empty()
    }

    /// Number of queued items. Snapshot only, like [`is_empty`](SyncQueue::is_empty).
    pub fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }
}

impl<T> Default for SyncQueue<T> {
    fn default() -> Self {
        SyncQueue::new()
    }
}
