//! WebSocket transport types and configuration

use std::time::Duration;
use thiserror::Error;

/// Close code for a deliberate, orderly shutdown
pub const NORMAL_CLOSURE: u16 = 1000;

/// Close code reported when the stream ends without a close frame
pub const ABNORMAL_CLOSURE: u16 = 1006;

/// WebSocket transport configuration
#[derive(Debug, Clone)]
pub struct WsConfig {
    /// Interval for sending ping frames
    pub ping_interval: Duration,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            ping_interval: Duration::from_secs(30),
        }
    }
}

impl WsConfig {
    /// Set ping interval
    pub fn ping_interval(mut self, d: Duration) -> Self {
        self.ping_interval = d;
        self
    }
}

/// Events surfaced by an open transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Text frame
    Text(String),
    /// Peer closed the connection
    Closed { code: u16, reason: String },
    /// Socket-level failure
    Error(String),
}

/// WebSocket errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WsError {
    /// Connection could not be established or broke
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    /// Peer closed with a non-normal code
    #[error("Connection closed with code {code}: {reason}")]
    Closed { code: u16, reason: String },
    /// Send failed
    #[error("Send failed: {0}")]
    SendFailed(String),
}
