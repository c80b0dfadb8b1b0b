//! Log stream connection lifecycle
//!
//! Connects to the log server, decodes frames, and feeds entries through the
//! admission pipeline. Reconnects after any failure with a fixed delay and no
//! retry limit.

mod manager;
mod types;

pub use manager::ConnectionManager;
pub use types::{
    ConnectionState, StreamConfig, StreamError, CONNECTION_SOURCE, DEFAULT_CONNECT_TIMEOUT,
    DEFAULT_RECONNECT_DELAY,
};
