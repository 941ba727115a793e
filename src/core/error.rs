//! Error types for scheduler operations.

use thiserror::Error;

/// Errors produced by scheduler components.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Pool, device, or pending request absent.
    #[error("not found: {0}")]
    NotFound(String),
    /// Release target is not currently owned.
    #[error("not owner: {0}")]
    NotOwner(String),
    /// Predicate matched no eligible device and the request could not queue.
    #[error("no matching device for `{0}`")]
    NoMatch(String),
    /// The only devices matching the predicate are leased.
    #[error("device already leased: {0}")]
    AlreadyLeased(String),
    /// A pool with that name already exists.
    #[error("already exists: {0}")]
    AlreadyExists(String),
    /// Pool still has pending requests or owned slots.
    #[error("pool in use: {0}")]
    PoolBusy(String),
    /// Synchronous wait exceeded its budget.
    #[error("timed out waiting for a device")]
    Timeout,
    /// External gateway call failed.
    #[error("dispatch failed: {0}")]
    DispatchFailed(String),
    /// Slot or queue capacity reached.
    #[error("capacity exceeded: {0}")]
    Exceeded(String),
    /// Predicate string could not be parsed.
    #[error("invalid predicate: {0}")]
    InvalidPredicate(String),
    /// Request arguments were rejected.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// Pool snapshot file is malformed.
    #[error("snapshot error: {0}")]
    Snapshot(String),
    /// Filesystem failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Configuration rejected.
    #[error("config invalid: {0}")]
    Config(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
