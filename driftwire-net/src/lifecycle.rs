//! Observable connection lifecycle state.
//!
//! ```text
//! CREATED --register--> REGISTERED --io_error / close--> CLOSING --> UNREGISTERED --> DESTROYED
//! ```
//!
//! `Destroyed` has no corresponding stored state — it is simply "the last
//! `Arc<Connection>` dropped" and is not observable except by absence.

use std::sync::atomic::{AtomicU8, Ordering};

/// A connection's position in the lifecycle state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Created,
    Registered,
    Closing,
    Unregistered,
}

impl ConnectionState {
    const fn to_tag(self) -> u8 {
        match self {
            Self::Created => 0,
            Self::Registered => 1,
            Self::Closing => 2,
            Self::Unregistered => 3,
        }
    }

    const fn from_tag(tag: u8) -> Self {
        match tag {
            0 => Self::Created,
            1 => Self::Registered,
            2 => Self::Closing,
            _ => Self::Unregistered,
        }
    }
}

/// An atomic cell holding a [`ConnectionState`], shared between a
/// connection's handle and its I/O tasks.
#[derive(Debug, Default)]
pub struct LifecycleCell(AtomicU8);

impl LifecycleCell {
    #[must_use]
    pub fn new() -> Self {
        Self(AtomicU8::new(ConnectionState::Created.to_tag()))
    }

    #[must_use]
    pub fn get(&self) -> ConnectionState {
        ConnectionState::from_tag(self.0.load(Ordering::Acquire))
    }

    pub fn set(&self, state: ConnectionState) {
        self.0.store(state.to_tag(), Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions_are_observable() {
        let cell = LifecycleCell::new();
        assert_eq!(cell.get(), ConnectionState::Created);
        cell.set(ConnectionState::Registered);
        assert_eq!(cell.get(), ConnectionState::Registered);
        cell.set(ConnectionState::Closing);
        cell.set(ConnectionState::Unregistered);
        assert_eq!(cell.get(), ConnectionState::Unregistered);
    }
}
