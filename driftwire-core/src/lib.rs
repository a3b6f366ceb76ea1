//! Driftwire Core
//!
//! Runtime-agnostic building blocks shared by the protocol layer:
//! - Named cooperative executor groups (`pool`)
//! - Byte-based send-queue backpressure (`backpressure`)
//! - Cancellation-safe write guard (`poison`)
//! - Generic TCP socket tuning (`tcp`)
//! - Error types (`error`)

#![deny(unsafe_code)]
#![allow(clippy::module_name_repetitions)]

pub mod backpressure;
pub mod error;
pub mod poison;
pub mod pool;
pub mod tcp;

pub mod prelude {
    pub use crate::backpressure::{BytePermits, NoOpPermits, Permit};
    pub use crate::error::{CoreError, Result};
    pub use crate::poison::PoisonGuard;
    pub use crate::pool::Group;
}
