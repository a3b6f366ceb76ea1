//! Driftwire Net
//!
//! Length-prefixed framed TCP transport: frame codec, per-connection
//! send-queue-backed connection actor, receive dispatch, registry, and the
//! acceptor/connector that produce connections from listen or dial.

#![deny(unsafe_code)]
#![allow(clippy::module_name_repetitions)]

pub mod acceptor;
pub mod connection;
pub mod connector;
pub mod dispatch;
pub mod error;
pub mod frame;
pub mod handler;
pub mod lifecycle;
pub mod registry;
pub mod service;
pub mod tickrate;

pub mod prelude {
    pub use crate::connection::Connection;
    pub use crate::dispatch::OwnedMessage;
    pub use crate::error::{NetError, Result};
    pub use crate::frame::Frame;
    pub use crate::handler::Handler;
    pub use crate::lifecycle::ConnectionState;
    pub use crate::registry::Registry;
    pub use crate::service::{GroupSizes, Service};
}
