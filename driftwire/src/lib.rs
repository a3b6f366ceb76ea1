//! # Driftwire
//!
//! An asynchronous TCP messaging core: a length-prefixed framed transport,
//! a per-connection send queue, named executor groups, and a
//! registry/lifecycle manager that dispatches inbound frames to an
//! application [`Handler`](driftwire_net::handler::Handler) with broadcast
//! support.
//!
//! ## Architecture
//!
//! - **`driftwire-core`**: runtime-agnostic building blocks — executor
//!   groups, byte-based backpressure, socket tuning.
//! - **`driftwire-net`**: the protocol layer — frame codec, connection
//!   actor, registry, acceptor/connector, tick-rate meter.
//! - **`driftwire`** (this crate): the public facade, `Config`, and
//!   tracing setup.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use driftwire::Config;
//! use driftwire_net::handler::Handler;
//! use driftwire_net::service::Service;
//!
//! struct Echo;
//! impl Handler for Echo {}
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let service = Service::start(config.group_sizes(), Arc::new(Echo))?;
//! service.serve(config.port).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

/// Runtime-agnostic building blocks (executor groups, socket tuning).
pub use driftwire_core as core;
/// The protocol layer (frame codec, connection, registry, acceptor/connector).
pub use driftwire_net as net;

/// Startup configuration, matching `spec.md` §6's option table.
pub use config::Config;
/// The wire-facing error taxonomy and its result alias.
pub use driftwire_net::error::{NetError, Result};
/// The application-facing lifecycle/message capability trait.
pub use driftwire_net::handler::Handler;
/// Executor group sizes and the facade over the protocol layer.
pub use driftwire_net::service::{GroupSizes, Service};

mod config;

/// Development helpers (demos/tests).
pub mod dev_tracing;
