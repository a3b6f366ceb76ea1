//! Registry: the `id -> Connection` map and its serializer.
//!
//! A single actor task owns a plain `HashMap` — no `DashMap`, no external
//! mutex. Every mutation and every broadcast iteration goes through that
//! one task's command channel, so registration, unregistration, and
//! broadcast linearize with respect to each other by construction, exactly
//! as the design's "registry owns one serializer sourced from control"
//! requires.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

use driftwire_core::pool::Group;

use crate::connection::{CloseCallback, Connection};
use crate::frame::Frame;
use crate::handler::Handler;
use crate::lifecycle::ConnectionState;

/// Process-wide monotonic id counter. Starts at 10000; uniqueness is only
/// guaranteed within one process lifetime.
static NEXT_ID: AtomicU32 = AtomicU32::new(10000);

/// Assigns the next connection id.
pub fn next_connection_id() -> u32 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

enum Command {
    Register(Arc<Connection>),
    Unregister(u32),
    Broadcast { frame: Frame, except: Option<u32> },
}

/// Clonable handle to the registry's actor task.
#[derive(Clone)]
pub struct Registry {
    tx: mpsc::UnboundedSender<Command>,
}

impl Registry {
    /// Spawns the registry's actor task onto `group` (the `control` group
    /// in the reference configuration) and returns a handle to it.
    #[must_use]
    pub fn spawn(group: &Group, handler: Arc<dyn Handler>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let _ = group.spawn(run(rx, handler));
        Self { tx }
    }

    /// Registers `conn`. Asserts (via `debug_assert!`) that its id is not
    /// already present — the caller is responsible for only registering a
    /// freshly constructed connection once.
    pub fn register(&self, conn: Arc<Connection>) {
        let _ = self.tx.send(Command::Register(conn));
    }

    /// Unregisters the connection with `id`, if present.
    pub fn unregister(&self, id: u32) {
        let _ = self.tx.send(Command::Unregister(id));
    }

    /// Posts a frame to every registered connection except `except`, and
    /// returns without waiting for any send to complete.
    pub fn broadcast(&self, frame: Frame, except: Option<u32>) {
        let _ = self.tx.send(Command::Broadcast { frame, except });
    }

    /// Builds a [`CloseCallback`] that unregisters through this registry.
    /// Given to each connection at construction so it can notify its own
    /// removal without holding a reference back into the registry itself.
    #[must_use]
    pub fn close_callback(&self) -> CloseCallback {
        let tx = self.tx.clone();
        Arc::new(move |id| {
            let _ = tx.send(Command::Unregister(id));
        })
    }
}

async fn run(mut rx: mpsc::UnboundedReceiver<Command>, handler: Arc<dyn Handler>) {
    let mut connections: HashMap<u32, Arc<Connection>> = HashMap::new();

    while let Some(cmd) = rx.recv().await {
        match cmd {
            Command::Register(conn) => {
                let id = conn.id();
                debug_assert!(!connections.contains_key(&id), "duplicate connection id {id}");
                conn.set_state(ConnectionState::Registered);
                connections.insert(id, conn.clone());
                handler.on_session_registered(conn);
            }
            Command::Unregister(id) => {
                if let Some(conn) = connections.remove(&id) {
                    conn.set_state(ConnectionState::Unregistered);
                    handler.on_session_unregistered(conn);
                }
            }
            Command::Broadcast { frame, except } => {
                for (id, conn) in &connections {
                    if Some(*id) != except {
                        let _ = conn.send(frame.clone());
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_increase_monotonically() {
        let a = next_connection_id();
        let b = next_connection_id();
        assert!(b > a);
    }
}
