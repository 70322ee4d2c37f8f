#![deny(missing_docs)]
//! A fixed-size worker thread pool with a shared task queue
pub use err::{PoolError, Result};
pub use pool::{TaskHandle, ThreadPool};
pub use queue::SyncQueue;
pub use timer::Timer;

mod pool;
mod queue;
mod timer;

pub mod err;
