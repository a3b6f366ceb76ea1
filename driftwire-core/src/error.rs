//! Core error types.
//!
//! Scoped to the runtime-agnostic building blocks this crate owns (executor
//! groups, socket tuning). Wire-facing errors (framing, connection I/O,
//! registry) live in `driftwire-net::error::NetError`.

use thiserror::Error;

/// Errors raised by `driftwire-core`.
#[derive(Error, Debug)]
pub enum CoreError {
    /// An executor group was asked to spawn work after `stop()`.
    #[error("executor group '{0}' is stopped")]
    GroupStopped(&'static str),

    /// A named executor group was configured with zero worker threads.
    #[error("executor group '{0}' requires at least one worker thread")]
    EmptyGroup(&'static str),

    /// Failed to spin up a group's worker thread/runtime.
    #[error("failed to start worker thread for group '{0}': {1}")]
    WorkerStartFailed(&'static str, std::io::Error),
}

/// Result type alias for `driftwire-core` operations.
pub type Result<T> = std::result::Result<T, CoreError>;
