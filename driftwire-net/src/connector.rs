//! Connector: the client-side socket producer.
//!
//! Resolves `host`/`service`, then connects `n_connects` sockets **one at a
//! time** — each connect is only issued once the previous one has settled
//! (success or exhausted its resolved endpoints). This sequencing is
//! reproduced faithfully from the original client's `ConnectAsync`/
//! `OnConnectCompleted` loop: it bounds in-flight connect attempts to one
//! per `Connector`, a deliberate, observable difference from "fire `n`
//! concurrent connects".

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpStream;

use driftwire_core::pool::Group;

use crate::connection;
use crate::dispatch::CallbackDispatcher;
use crate::error::NetError;
use crate::registry::Registry;

/// Resolves `host:service` and connects `n_connects` sockets sequentially,
/// registering each as it succeeds. Errors on individual connects are
/// logged and the loop continues with the next requested connect.
///
/// # Errors
///
/// Returns [`NetError::ResolveFailed`] if resolution itself fails; this
/// aborts the whole call, since no endpoint exists to connect to.
pub async fn connect_n(
    host: &str,
    service: &str,
    n_connects: usize,
    io_group: &Group,
    dispatcher: Arc<CallbackDispatcher>,
    registry: Registry,
    max_frame_size: u32,
) -> Result<(), NetError> {
    let port = service.parse::<u16>().map_err(|_| NetError::ResolveFailed {
        host: host.to_string(),
        service: service.to_string(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "service must be a numeric port"),
    })?;

    let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host, port))
        .await
        .map_err(|source| NetError::ResolveFailed { host: host.to_string(), service: service.to_string(), source })?
        .collect();

    if addrs.is_empty() {
        return Err(NetError::ResolveFailed {
            host: host.to_string(),
            service: service.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no addresses resolved"),
        });
    }

    let close_callback = registry.close_callback();

    for _ in 0..n_connects {
        match connect_one(&addrs).await {
            Ok(stream) => match connection::spawn(stream, io_group, dispatcher.clone(), close_callback.clone(), max_frame_size) {
                Ok(conn) => registry.register(conn),
                Err(err) => tracing::warn!(error = %err, "failed to prepare connected socket"),
            },
            Err(err) => tracing::warn!(%err, "connect failed for all resolved endpoints, continuing"),
        }
    }

    Ok(())
}

/// Tries each resolved endpoint in turn; the connection is established as
/// soon as any endpoint succeeds.
async fn connect_one(addrs: &[SocketAddr]) -> Result<TcpStream, NetError> {
    let mut last_err = None;
    for addr in addrs {
        match TcpStream::connect(addr).await {
            Ok(stream) => return Ok(stream),
            Err(source) => last_err = Some(NetError::ConnectFailed { addr: *addr, source }),
        }
    }
    Err(last_err.expect("addrs is non-empty"))
}
