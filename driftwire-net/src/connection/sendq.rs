//! Per-connection send queue.
//!
//! An unbounded (by default) ordered queue feeding the write pump. Pushing
//! a frame never blocks and never fails unless a high-water mark has been
//! configured and exceeded — the reference behavior leaves it unbounded,
//! per the design's explicit sign-off on unbounded-by-default with an
//! optional configurable cap.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::error::NetError;
use crate::frame::Frame;

/// An item flowing through the send queue's channel: either a frame to
/// write, or the close signal that makes the write pump stop after
/// draining nothing further.
pub(crate) enum Item {
    Frame(Frame),
    Close,
}

pub(crate) type Receiver = mpsc::UnboundedReceiver<Item>;

/// Handle to a connection's outbound queue. Pushes are lock-free relative
/// to the write pump, which is the sole consumer and decrements `depth` as
/// it drains frames.
pub struct SendQueue {
    tx: mpsc::UnboundedSender<Item>,
    depth: Arc<AtomicUsize>,
    high_water_mark: Option<usize>,
    connection_id: u32,
}

impl SendQueue {
    pub(crate) fn new(connection_id: u32) -> (Self, Receiver, Arc<AtomicUsize>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let depth = Arc::new(AtomicUsize::new(0));
        (Self { tx, depth: depth.clone(), high_water_mark: None, connection_id }, rx, depth)
    }

    /// Configures an optional high-water mark; pushes beyond it return
    /// [`NetError::QueueFull`] instead of enqueueing.
    #[must_use]
    pub fn with_high_water_mark(mut self, hwm: usize) -> Self {
        self.high_water_mark = Some(hwm);
        self
    }

    pub(crate) fn push(&self, frame: Frame) -> Result<(), NetError> {
        if let Some(hwm) = self.high_water_mark {
            let depth = self.depth.load(Ordering::Relaxed);
            if depth >= hwm {
                return Err(NetError::QueueFull { connection_id: self.connection_id, depth });
            }
        }
        self.depth.fetch_add(1, Ordering::Relaxed);
        let _ = self.tx.send(Item::Frame(frame));
        Ok(())
    }

    pub(crate) fn push_close(&self) {
        let _ = self.tx.send(Item::Close);
    }
}
