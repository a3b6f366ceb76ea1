//! Echo server demo: replies to every echo request and logs the measured
//! tick rate once a second. Reproduces `original_source`'s `Server::Service`.

use std::sync::Arc;

use clap::Parser;

use driftwire::net::prelude::*;
use driftwire::{Config, Handler, Result, Service};

/// `Client::MessageId::Echo` in `original_source`.
const ECHO_REQUEST_ID: u32 = 1000;
/// `Server::MessageId::Echo` in `original_source`.
const ECHO_REPLY_ID: u32 = 502;

struct EchoServer;

impl Handler for EchoServer {
    fn on_session_registered(&self, conn: Arc<Connection>) {
        tracing::info!(connection_id = conn.id(), remote = %conn.remote_addr(), "session registered");
    }

    fn on_session_unregistered(&self, conn: Arc<Connection>) {
        tracing::info!(connection_id = conn.id(), "session unregistered");
    }

    fn on_message(&self, msg: OwnedMessage) {
        if msg.frame.id() != ECHO_REQUEST_ID {
            return;
        }
        if let Err(err) = msg.connection.send(Frame::empty(ECHO_REPLY_ID)) {
            tracing::warn!(connection_id = msg.connection.id(), error = %err, "echo reply failed");
        }
    }

    fn on_tick_rate(&self, rate: u32) {
        tracing::info!(hz = rate, "tick rate");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    driftwire::dev_tracing::init_tracing();
    let config = Config::parse();

    let service = Service::start(config.group_sizes(), Arc::new(EchoServer))
        .expect("failed to start executor groups");

    let bound = service.serve(config.port).await?;
    tracing::info!(addr = %bound, "server listening");

    std::future::pending::<()>().await;
    Ok(())
}
