use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SchedulerError>;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("scheduler capacity must be at least 1 (the reserved rebase event)")]
    ZeroCapacity,

    #[error("out of memory allocating {len} event slots")]
    OutOfMemory { len: usize },

    #[error("state buffer too small (need {needed} bytes, have {available} bytes)")]
    BufferTooSmall { needed: usize, available: usize },

    #[error("malformed scheduler state: {0}")]
    Malformed(&'static str),
}
