//! Acceptor: the server-side socket producer.
//!
//! Binds once, then loops accepting. The loop never awaits connection
//! handshake work — as soon as a socket is obtained the next `accept()` is
//! issued, matching the design's "the acceptor never awaits connection
//! handshake work" requirement.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use driftwire_core::pool::Group;

use crate::connection;
use crate::dispatch::CallbackDispatcher;
use crate::error::NetError;
use crate::registry::Registry;

/// Binds `0.0.0.0:port` and spawns the accept loop onto `control_group`.
/// Each accepted socket's read/write pumps are spawned onto `io_group`.
///
/// # Errors
///
/// Returns [`NetError::AcceptFailed`] only if the initial bind fails; a
/// failure of an individual `accept()` call is logged and accepting
/// continues.
pub async fn bind_and_serve(
    port: u16,
    io_group: Arc<Group>,
    control_group: &Group,
    registry: Registry,
    dispatcher: Arc<CallbackDispatcher>,
    max_frame_size: u32,
) -> Result<SocketAddr, NetError> {
    let listener = TcpListener::bind(("0.0.0.0", port))
        .await
        .map_err(NetError::AcceptFailed)?;
    let local_addr = listener.local_addr().map_err(NetError::AcceptFailed)?;

    let close_callback = registry.close_callback();

    let _ = control_group.spawn(async move {
        loop {
            match listener.accept().await {
                Ok((stream, _peer)) => {
                    match connection::spawn(stream, &io_group, dispatcher.clone(), close_callback.clone(), max_frame_size) {
                        Ok(conn) => registry.register(conn),
                        Err(err) => tracing::warn!(error = %err, "failed to prepare accepted socket"),
                    }
                }
                Err(err) => {
                    tracing::warn!(error = %err, "accept failed, continuing");
                }
            }
        }
    });

    Ok(local_addr)
}
