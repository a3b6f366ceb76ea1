//! Receive dispatch: move decoded frames from a connection's read loop to
//! the application.
//!
//! Both shapes named in the design are provided; callers choose one.
//!
//! - [`CallbackDispatcher`] invokes `Handler::on_message` directly from the
//!   read-continuation context. Lowest latency; handlers must not block.
//! - [`BufferedDispatcher`] pushes onto a bounded channel drained by a pool
//!   of worker tasks on the handler group. Throttles bursts and gives the
//!   tick-rate meter a loop-iteration counter to sample instead of a raw
//!   message counter.
//!
//! Delivery ordering is preserved in both shapes: a connection's read loop
//! calls `dispatch` synchronously with respect to its own reads, so frames
//! from one connection are handed off in wire order. Frames from different
//! connections may interleave arbitrarily, exactly as the design requires.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::connection::Connection;
use crate::frame::Frame;
use crate::handler::Handler;

/// A decoded frame paired with the connection it arrived on.
#[derive(Debug, Clone)]
pub struct OwnedMessage {
    pub connection: Arc<Connection>,
    pub frame: Frame,
}

/// Shared counter sampled once a second by the tick-rate meter. Dispatchers
/// increment it per delivered message (callback shape) or per drained item
/// (buffered shape).
#[derive(Clone, Default)]
pub struct TickCounter(Arc<AtomicU32>);

impl TickCounter {
    #[must_use]
    pub fn new() -> Self {
        Self(Arc::new(AtomicU32::new(0)))
    }

    pub(crate) fn increment(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    /// Atomically reads and resets the counter. Used by the tick-rate timer.
    pub(crate) fn sample(&self) -> u32 {
        self.0.swap(0, Ordering::Relaxed)
    }
}

/// Invokes `Handler::on_message` directly from the caller's context.
pub struct CallbackDispatcher {
    handler: Arc<dyn Handler>,
    ticks: TickCounter,
}

impl CallbackDispatcher {
    #[must_use]
    pub fn new(handler: Arc<dyn Handler>, ticks: TickCounter) -> Self {
        Self { handler, ticks }
    }

    pub fn dispatch(&self, msg: OwnedMessage) {
        self.ticks.increment();
        self.handler.on_message(msg);
    }
}

/// Pushes onto a bounded channel drained by worker tasks on the handler
/// group. `push` never blocks the read loop beyond acquiring channel
/// capacity; callers that need a non-blocking `send` should size the
/// channel generously relative to expected burst depth.
pub struct BufferedDispatcher {
    tx: mpsc::Sender<OwnedMessage>,
}

impl BufferedDispatcher {
    /// Spawns `n_workers` drain loops onto `group`, each pulling from a
    /// shared bounded channel of capacity `capacity` and calling
    /// `handler.on_message`.
    pub fn spawn(
        group: &driftwire_core::pool::Group,
        handler: Arc<dyn Handler>,
        ticks: TickCounter,
        capacity: usize,
        n_workers: usize,
    ) -> Self {
        let (tx, rx) = mpsc::channel(capacity);
        let rx = Arc::new(tokio::sync::Mutex::new(rx));
        for _ in 0..n_workers.max(1) {
            let rx = rx.clone();
            let handler = handler.clone();
            let ticks = ticks.clone();
            let _ = group.spawn(async move {
                loop {
                    let msg = {
                        let mut rx = rx.lock().await;
                        rx.recv().await
                    };
                    match msg {
                        Some(msg) => {
                            ticks.increment();
                            handler.on_message(msg);
                        }
                        None => break,
                    }
                }
            });
        }
        Self { tx }
    }

    /// Queues `msg` for a worker to pick up. Drops the message and logs if
    /// the channel is closed (all workers gone).
    pub async fn push(&self, msg: OwnedMessage) {
        if self.tx.send(msg).await.is_err() {
            tracing::warn!("buffered dispatcher channel closed, dropping message");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_counter_resets_on_sample() {
        let ticks = TickCounter::new();
        ticks.increment();
        ticks.increment();
        assert_eq!(ticks.sample(), 2);
        assert_eq!(ticks.sample(), 0);
    }
}
