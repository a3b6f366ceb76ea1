//! TCP utilities for high-performance networking.
//!
//! This module provides generic TCP optimizations that are protocol-agnostic.
//! Socket options are applied through `socket2::SockRef`, which borrows the
//! raw descriptor safely — no `unsafe` needed here.

use std::io;

use socket2::SockRef;

/// Disables Nagle's algorithm on `stream`, trading bandwidth efficiency for
/// lower latency. Useful for request-reply and ping-style traffic.
///
/// # Errors
///
/// Returns an error if the socket option cannot be set.
#[inline]
pub fn enable_tcp_nodelay(stream: &tokio::net::TcpStream) -> io::Result<()> {
    SockRef::from(stream).set_nodelay(true)
}

/// Sets the kernel send/receive buffer sizes on `stream`, when configured.
///
/// # Errors
///
/// Returns an error if either socket option cannot be set.
pub fn set_socket_buf_size(stream: &tokio::net::TcpStream, size: usize) -> io::Result<()> {
    let sock = SockRef::from(stream);
    sock.set_send_buffer_size(size)?;
    sock.set_recv_buffer_size(size)?;
    Ok(())
}
