//! Connection: owns one socket, serializes writes, drives reads.
//!
//! Reads and writes run as two independent tasks over the two halves of a
//! split [`tokio::net::TcpStream`] — there is no mutex around the socket
//! because each half only ever has one task touching it. The write task
//! *is* the per-connection serializer: every `send` posts onto its channel
//! rather than writing directly, so frames from any number of producers
//! serialize through one pump exactly as the design's strand/serializer
//! token requires.

pub mod sendq;

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

use driftwire_core::pool::Group;

use crate::dispatch::{CallbackDispatcher, OwnedMessage};
use crate::error::NetError;
use crate::frame::{read_frame, write_frame, Frame};
use crate::lifecycle::{ConnectionState, LifecycleCell};
use crate::registry::next_connection_id;
use sendq::SendQueue;

/// Called exactly once per connection, when the connection transitions out
/// of the registry. Typically wraps `Registry::unregister`. Kept as a
/// callback rather than a back-reference to the registry so `Connection`
/// never holds an `Arc` pointing into its own owner.
pub type CloseCallback = Arc<dyn Fn(u32) + Send + Sync>;

/// A live, identified TCP endpoint.
pub struct Connection {
    id: u32,
    remote_addr: SocketAddr,
    queue: SendQueue,
    closing: Arc<AtomicBool>,
    state: LifecycleCell,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("remote_addr", &self.remote_addr)
            .field("state", &self.state.get())
            .finish()
    }
}

impl Connection {
    #[must_use]
    pub const fn id(&self) -> u32 {
        self.id
    }

    #[must_use]
    pub const fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }

    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state.get()
    }

    /// Advances the observable lifecycle state. Called by
    /// [`crate::registry::Registry`] at registration/unregistration.
    pub(crate) fn set_state(&self, state: ConnectionState) {
        self.state.set(state);
    }

    /// Enqueues `frame` for transmission. Completes immediately and never
    /// blocks the caller; frames from one caller serialize in submission
    /// order, interleaved with other callers by the write pump.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::QueueFull`] if a high-water mark is configured
    /// and exceeded. The reference configuration has none, so `send` never
    /// fails in practice.
    pub fn send(&self, frame: Frame) -> Result<(), NetError> {
        self.queue.push(frame)
    }

    /// Idempotent: only the first call shuts down the socket and notifies
    /// the registry. Later calls are no-ops.
    pub fn close(&self) {
        begin_close(&self.closing, &self.queue);
    }

    #[must_use]
    pub fn is_closing(&self) -> bool {
        self.closing.load(Ordering::Acquire)
    }
}

/// Spawns the read loop and write pump for an accepted/connected socket,
/// assigns it a fresh id, and returns the shared handle. Does not register
/// with a [`crate::registry::Registry`] — callers do that once this
/// returns, matching the acceptor/connector's shared "construct then
/// register" path.
pub fn spawn(
    stream: TcpStream,
    io_group: &Group,
    dispatcher: Arc<CallbackDispatcher>,
    close_callback: CloseCallback,
    max_frame_size: u32,
) -> std::io::Result<Arc<Connection>> {
    driftwire_core::tcp::enable_tcp_nodelay(&stream)?;
    let remote_addr = stream.peer_addr()?;
    let id = next_connection_id();
    let (read_half, write_half) = stream.into_split();

    let closing = Arc::new(AtomicBool::new(false));
    let (queue, write_rx, depth) = SendQueue::new(id);

    let conn = Arc::new(Connection {
        id,
        remote_addr,
        queue,
        closing: closing.clone(),
        state: LifecycleCell::new(),
    });

    let _ = io_group.spawn(write_pump(write_half, write_rx, depth, id, closing.clone(), close_callback));
    let _ = io_group.spawn(read_loop(read_half, conn.clone(), dispatcher, max_frame_size));

    Ok(conn)
}

async fn read_loop(
    mut reader: OwnedReadHalf,
    conn: Arc<Connection>,
    dispatcher: Arc<CallbackDispatcher>,
    max_frame_size: u32,
) {
    loop {
        match read_frame(&mut reader, conn.id, max_frame_size).await {
            Ok(frame) => {
                dispatcher.dispatch(OwnedMessage { connection: conn.clone(), frame });
            }
            Err(err) => {
                tracing::debug!(connection_id = conn.id, error = %err, "read loop closing connection");
                break;
            }
        }
    }
    begin_close(&conn.closing, &conn.queue);
}

async fn write_pump(
    mut writer: OwnedWriteHalf,
    mut rx: sendq::Receiver,
    depth: Arc<AtomicUsize>,
    connection_id: u32,
    closing: Arc<AtomicBool>,
    close_callback: CloseCallback,
) {
    while let Some(item) = rx.recv().await {
        match item {
            sendq::Item::Frame(frame) => {
                depth.fetch_sub(1, Ordering::Relaxed);
                if let Err(err) = write_frame(&mut writer, &frame, connection_id).await {
                    tracing::debug!(connection_id, error = %err, "write pump closing connection");
                    break;
                }
            }
            sendq::Item::Close => break,
        }
    }

    // The pump's loop runs exactly once per connection, so everything past
    // this point — socket shutdown, the registry notification — happens
    // exactly once regardless of which path (explicit close, write error,
    // or the read loop's EOF handoff) ended the loop.
    closing.store(true, Ordering::Release);
    use tokio::io::AsyncWriteExt;
    if let Err(source) = writer.shutdown().await {
        let err = NetError::CloseFailed { connection_id, source };
        tracing::debug!(connection_id, error = %err, "socket shutdown reported an error");
    }
    close_callback(connection_id);
}

/// Marks the connection as closing and, if this is the first caller to do
/// so, wakes the write pump so it runs its one-time shutdown path. The
/// write pump (not this function) owns the single `close_callback`
/// invocation.
fn begin_close(closing: &AtomicBool, queue: &SendQueue) {
    if !closing.swap(true, Ordering::AcqRel) {
        queue.push_close();
    }
}
