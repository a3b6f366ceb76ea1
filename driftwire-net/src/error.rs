//! Wire-facing error taxonomy.
//!
//! Mirrors the policy table in the core's error handling design: I/O errors
//! never cross an `await` unresolved — the continuation that sees them
//! decides close-vs-continue and logs at that point, so `NetError` values
//! themselves do not escape to [`crate::handler::Handler`].

use std::net::SocketAddr;

use thiserror::Error;

/// Errors raised by `driftwire-net`.
#[derive(Error, Debug)]
pub enum NetError {
    /// Hostname resolution failed on the client side. Aborts `connect_n`.
    #[error("failed to resolve {host}:{service}: {source}")]
    ResolveFailed { host: String, service: String, source: std::io::Error },

    /// Every resolved endpoint failed to connect. The connector logs and
    /// continues with its remaining requested connects.
    #[error("failed to connect to {addr}: {source}")]
    ConnectFailed { addr: SocketAddr, source: std::io::Error },

    /// The acceptor's `accept()` call failed. Logged; accepting continues.
    #[error("accept failed: {0}")]
    AcceptFailed(std::io::Error),

    /// Socket read error mid-frame. Terminal for this connection.
    #[error("read failed on connection {connection_id}: {source}")]
    ReadFailed { connection_id: u32, source: std::io::Error },

    /// Socket write error mid-frame. Terminal for this connection.
    #[error("write failed on connection {connection_id}: {source}")]
    WriteFailed { connection_id: u32, source: std::io::Error },

    /// `extract_tail` was asked for more bytes than the payload holds.
    /// Reported to the caller; does not close the connection.
    #[error("frame underflow: need {needed} bytes, payload has {have}")]
    FrameUnderflow { needed: usize, have: usize },

    /// The wire header declared a `size` smaller than the header itself, or
    /// larger than the configured maximum. Terminal for this connection.
    #[error("invalid frame: declared size {size} ({reason})")]
    InvalidFrame { size: u32, reason: &'static str },

    /// The send queue's configured high-water mark was exceeded. Reported
    /// to the caller; the core applies no policy of its own.
    #[error("send queue full on connection {connection_id} (depth {depth})")]
    QueueFull { connection_id: u32, depth: usize },

    /// The tick-rate timer failed to rearm. Logged; rearming stops.
    /// `tokio::time::interval` never fails, so `tickrate::spawn` never
    /// constructs this; kept for the declared taxonomy's completeness.
    #[error("tick-rate timer failed: {0}")]
    TimerFailed(std::io::Error),

    /// Socket shutdown reported an error. Logged; lifecycle continues.
    #[error("close failed on connection {connection_id}: {source}")]
    CloseFailed { connection_id: u32, source: std::io::Error },
}

/// Result type alias for `driftwire-net` operations.
pub type Result<T> = std::result::Result<T, NetError>;
