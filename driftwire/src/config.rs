//! Startup configuration, matching `spec.md` §6's option table.
//!
//! `Config` is plain data so library embedders can construct it without
//! `clap`; the demo binaries build it from `clap::Parser` for their CLI.

use clap::Parser;

use driftwire_net::service::GroupSizes;

/// Executor group sizes and endpoint configuration shared by the client and
/// server demos.
#[derive(Debug, Clone, Parser)]
#[command(about = "driftwire demo configuration")]
pub struct Config {
    /// Worker count for socket serializers.
    #[arg(long, default_value_t = 4)]
    pub socket_io_threads: usize,

    /// Worker count for registry/accept/connect.
    #[arg(long, default_value_t = 2)]
    pub control_threads: usize,

    /// Worker count for application message dispatch.
    #[arg(long, default_value_t = 4)]
    pub handler_threads: usize,

    /// Worker count for timers.
    #[arg(long, default_value_t = 2)]
    pub timer_threads: usize,

    /// Hostname or IP to resolve (client only).
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port or service name to resolve (client only).
    #[arg(long, default_value = "60000")]
    pub service: String,

    /// Local bind port (server only).
    #[arg(long, default_value_t = 60000)]
    pub port: u16,

    /// Number of simultaneous outbound connections (client only). When
    /// `None`, the client demo prompts for this value on stdin.
    #[arg(long)]
    pub n_connects: Option<usize>,
}

impl Config {
    #[must_use]
    pub const fn group_sizes(&self) -> GroupSizes {
        GroupSizes {
            socket_io: self.socket_io_threads,
            control: self.control_threads,
            handler: self.handler_threads,
            timer: self.timer_threads,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            socket_io_threads: 4,
            control_threads: 2,
            handler_threads: 4,
            timer_threads: 2,
            host: "127.0.0.1".to_string(),
            service: "60000".to_string(),
            port: 60000,
            n_connects: None,
        }
    }
}
