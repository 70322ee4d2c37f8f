//! err

use std::io;
use thiserror::Error;

/// PoolError
#[derive(Error, Debug)]
pub enum PoolError {
    /// submit after stop or kill
    #[error("the thread pool has been shut down")]
    PoolClosed,

    /// the submitted task panicked; surfaced when the caller reads its handle
    #[error("task panicked: {0}")]
    TaskPanicked(String),

    /// pool constructed with zero threads
    #[error("thread pool needs at least one thread")]
    NoThreads,

    /// worker thread spawn error
    #[error("io error: {0:?}")]
    IoError(#[from] io::Error),
}

/// Alias for a Result with the error type PoolError.
pub type Result<T> = std::result::Result<T, PoolError>;
