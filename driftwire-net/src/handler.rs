//! Application-facing capability trait.
//!
//! The core is parameterized by a `Handler`, never by inheritance — this is
//! the translation of the source's virtual `on_session_*`/`on_message`
//! hooks into a Rust trait object the `Service` holds as `Arc<dyn Handler>`.
//! All hooks default to no-ops so implementers override only what they need.

use std::sync::Arc;

use crate::connection::Connection;
use crate::dispatch::OwnedMessage;

/// Lifecycle and message hooks invoked by a [`crate::service::Service`].
///
/// Every hook runs on the control or handler executor group, never on
/// socket-io — implementations may block briefly without stalling reads.
pub trait Handler: Send + Sync + 'static {
    /// Called once a connection has been registered and is visible to
    /// broadcast.
    fn on_session_registered(&self, _conn: Arc<Connection>) {}

    /// Called once after a connection has been removed from the registry.
    fn on_session_unregistered(&self, _conn: Arc<Connection>) {}

    /// Called for every frame delivered from any connection, in that
    /// connection's wire order.
    fn on_message(&self, _msg: OwnedMessage) {}

    /// Called once per second with the number of events counted in the
    /// preceding window.
    fn on_tick_rate(&self, _rate: u32) {}
}
