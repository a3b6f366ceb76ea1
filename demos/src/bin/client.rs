//! Ping client demo: sends an echo frame on connect, times the reply, and
//! rearms a 1-second timer before echoing again. Reproduces
//! `original_source`'s `Client::Service`/`EchoTimer`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use clap::Parser;

use driftwire::net::prelude::*;
use driftwire::{Config, Result, Service};

/// `Client::MessageId::Echo` in `original_source`.
const ECHO_REQUEST_ID: u32 = 1000;
/// `Server::MessageId::Echo` in `original_source`.
const ECHO_REPLY_ID: u32 = 502;

struct PingClient {
    starts: Arc<Mutex<HashMap<u32, Instant>>>,
}

impl PingClient {
    fn new() -> Self {
        Self { starts: Arc::new(Mutex::new(HashMap::new())) }
    }

    fn echo(&self, conn: &Connection) {
        self.starts.lock().unwrap().insert(conn.id(), Instant::now());
        if let Err(err) = conn.send(Frame::empty(ECHO_REQUEST_ID)) {
            tracing::warn!(connection_id = conn.id(), error = %err, "echo send failed");
        }
    }
}

impl Handler for PingClient {
    fn on_session_registered(&self, conn: Arc<Connection>) {
        self.echo(&conn);
    }

    fn on_session_unregistered(&self, conn: Arc<Connection>) {
        self.starts.lock().unwrap().remove(&conn.id());
        tracing::info!(connection_id = conn.id(), "connection closed");
    }

    fn on_message(&self, msg: OwnedMessage) {
        if msg.frame.id() != ECHO_REPLY_ID {
            return;
        }

        let conn = msg.connection;
        let id = conn.id();
        let elapsed = self.starts.lock().unwrap().remove(&id).map(|start| start.elapsed());
        if let Some(elapsed) = elapsed {
            tracing::info!(connection_id = id, microseconds = elapsed.as_micros(), "echo");
        }

        let starts = self.starts.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            starts.lock().unwrap().insert(id, Instant::now());
            if let Err(err) = conn.send(Frame::empty(ECHO_REQUEST_ID)) {
                tracing::warn!(connection_id = id, error = %err, "echo send failed");
            }
        });
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    driftwire::dev_tracing::init_tracing();
    let config = Config::parse();

    let n_connects = match config.n_connects {
        Some(n) => n,
        None => prompt_n_connects(),
    };

    let handler = Arc::new(PingClient::new());
    let service = Service::start(config.group_sizes(), handler)
        .expect("failed to start executor groups");

    service.connect(&config.host, &config.service, n_connects).await?;

    tracing::info!(n_connects, host = %config.host, service = %config.service, "client connected");
    std::future::pending::<()>().await;
    Ok(())
}

fn prompt_n_connects() -> usize {
    use std::io::{self, Write};

    print!("number of connections: ");
    io::stdout().flush().ok();
    let mut line = String::new();
    io::stdin().read_line(&mut line).ok();
    line.trim().parse().unwrap_or(1)
}
