//! `Service`: the generalized core the sample client and server share.
//!
//! The Rust shape of the original `ServiceBase`/`ClientServiceBase`/
//! `ServerServiceBase` split — one generic type parameterized by a
//! [`Handler`] implementation, holding the four named executor groups, the
//! registry, and the dispatch/tick-rate wiring. `demos/` builds a client
//! and a server on top of this without touching any of the pieces above.

use std::net::SocketAddr;
use std::sync::Arc;

use driftwire_core::pool::Group;

use crate::dispatch::{CallbackDispatcher, TickCounter};
use crate::error::NetError;
use crate::handler::Handler;
use crate::registry::Registry;
use crate::{acceptor, connector};

/// Executor group thread counts, matching `spec.md` §6's option table.
#[derive(Debug, Clone, Copy)]
pub struct GroupSizes {
    pub socket_io: usize,
    pub control: usize,
    pub handler: usize,
    pub timer: usize,
}

impl Default for GroupSizes {
    fn default() -> Self {
        Self { socket_io: 4, control: 2, handler: 4, timer: 2 }
    }
}

/// The maximum wire size (header + payload) a connection will accept
/// before closing with `InvalidFrame`.
const DEFAULT_MAX_FRAME_SIZE: u32 = 16 * 1024 * 1024;

/// Holds the executor groups, registry, and dispatch wiring shared by a
/// server or client deployment.
pub struct Service<H: Handler> {
    socket_io: Arc<Group>,
    control: Group,
    handler_group: Group,
    timer: Group,
    registry: Registry,
    dispatcher: Arc<CallbackDispatcher>,
    max_frame_size: u32,
    _handler: std::marker::PhantomData<H>,
}

impl<H: Handler> Service<H> {
    /// Starts all four executor groups and the registry's actor task.
    ///
    /// # Errors
    ///
    /// Returns an error if any executor group fails to start its worker
    /// threads.
    pub fn start(sizes: GroupSizes, handler: Arc<H>) -> Result<Self, driftwire_core::error::CoreError> {
        let socket_io = Arc::new(Group::start("socket-io", sizes.socket_io)?);
        let control = Group::start("control", sizes.control)?;
        let handler_group = Group::start("handler", sizes.handler)?;
        let timer = Group::start("timer", sizes.timer)?;

        let handler: Arc<dyn Handler> = handler;
        let registry = Registry::spawn(&control, handler.clone());

        let ticks = TickCounter::new();
        let dispatcher = Arc::new(CallbackDispatcher::new(handler.clone(), ticks.clone()));
        crate::tickrate::spawn(&timer, ticks, handler);

        Ok(Self {
            socket_io,
            control,
            handler_group,
            timer,
            registry,
            dispatcher,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            _handler: std::marker::PhantomData,
        })
    }

    #[must_use]
    pub fn with_max_frame_size(mut self, max_frame_size: u32) -> Self {
        self.max_frame_size = max_frame_size;
        self
    }

    /// The `handler` executor group, exposed so callers wanting the
    /// buffered dispatch shape can spawn [`crate::dispatch::BufferedDispatcher`]
    /// workers onto it directly.
    #[must_use]
    pub const fn handler_group(&self) -> &Group {
        &self.handler_group
    }

    /// Binds `0.0.0.0:port` and serves accepted connections until the
    /// service is stopped.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::AcceptFailed`] if the initial bind fails.
    pub async fn serve(&self, port: u16) -> Result<SocketAddr, NetError> {
        acceptor::bind_and_serve(
            port,
            self.socket_io.clone(),
            &self.control,
            self.registry.clone(),
            self.dispatcher.clone(),
            self.max_frame_size,
        )
        .await
    }

    /// Resolves `host:service` and connects `n_connects` sockets
    /// sequentially.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::ResolveFailed`] if resolution fails.
    pub async fn connect(&self, host: &str, service: &str, n_connects: usize) -> Result<(), NetError> {
        connector::connect_n(
            host,
            service,
            n_connects,
            &self.socket_io,
            self.dispatcher.clone(),
            self.registry.clone(),
            self.max_frame_size,
        )
        .await
    }

    /// Broadcasts `frame` to every registered connection except `except`.
    pub fn broadcast(&self, frame: crate::frame::Frame, except: Option<u32>) {
        self.registry.broadcast(frame, except);
    }

    /// Cancels all pending work across every executor group and waits for
    /// their worker threads to exit.
    pub fn stop(&mut self) {
        self.control.stop();
        self.handler_group.stop();
        self.timer.stop();
        if let Some(socket_io) = Arc::get_mut(&mut self.socket_io) {
            socket_io.stop();
        }
    }
}
