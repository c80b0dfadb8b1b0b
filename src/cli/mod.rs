//! CLI interface for opslog-stream
//!
//! Provides subcommands for:
//! - `tail`: Stream, filter and print log entries
//! - `status`: One-off health check of the log server
//! - `trigger`: Ask the log server to emit test entries
//! - `config`: Show the effective configuration

mod status;
mod tail;
mod trigger;

pub use status::StatusArgs;
pub use tail::TailArgs;
pub use trigger::TriggerArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "opslog-stream")]
#[command(about = "Real-time log stream client for the trading-bot dashboard")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stream, filter and print log entries until interrupted
    Tail(TailArgs),
    /// Check log server health
    Status(StatusArgs),
    /// Ask the log server to emit test entries
    Trigger(TriggerArgs),
    /// Show the effective configuration
    Config,
}
