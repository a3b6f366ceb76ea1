//! Byte-based backpressure for per-connection send queues.
//!
//! Design principle:
//! - Backpressure scales with **bytes**, not message count
//! - One giant frame should not starve other connections
//! - Pluggable: `NoOpPermits` (default) → a semaphore-backed policy later
//!
//! ```rust,ignore
//! let permit = permits.acquire(n_bytes).await;
//! writer.write(buf).await;
//! drop(permit); // releases automatically
//! ```

use async_trait::async_trait;

/// Backpressure permit trait.
///
/// Implementations gate a connection's send queue by byte count, returning
/// [`NetError::QueueFull`](crate::error::CoreError) equivalents at the call
/// site when a queue's high-water mark is exceeded.
#[async_trait]
pub trait BytePermits: Send + Sync {
    /// Acquires permission to enqueue `n_bytes` more payload.
    async fn acquire(&self, n_bytes: usize) -> Permit;
}

/// RAII permit guard. Releases on drop.
pub struct Permit {
    _private: (),
}

impl Permit {
    pub(crate) const fn new() -> Self {
        Self { _private: () }
    }
}

/// Grants every request immediately. The default until a queue's
/// high-water mark needs real enforcement.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpPermits;

#[async_trait]
impl BytePermits for NoOpPermits {
    async fn acquire(&self, _n_bytes: usize) -> Permit {
        Permit::new()
    }
}
