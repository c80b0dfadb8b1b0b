//! Connection lifecycle types

use crate::entry::{DecodeError, LogEntry};
use crate::telemetry::{set_gauge, GaugeMetric};
use crate::ws::WsError;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{broadcast, watch};

/// Source tag on entries the connection manager reports about itself
pub const CONNECTION_SOURCE: &str = "connection";

/// Default delay before reconnecting after a failure
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Default bound on how long a connection may stay in `Connecting`
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Lifecycle of the log stream transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Closing,
    Failed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Closing => "closing",
            ConnectionState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Connection manager settings
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Log stream endpoint
    pub url: String,
    /// Fixed delay before each reconnect attempt
    pub reconnect_delay: Duration,
    /// Maximum time spent in `Connecting`
    pub connect_timeout: Duration,
}

impl StreamConfig {
    /// Create a config for `url` with the default timers
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    pub fn reconnect_delay(mut self, d: Duration) -> Self {
        self.reconnect_delay = d;
        self
    }

    pub fn connect_timeout(mut self, d: Duration) -> Self {
        self.connect_timeout = d;
        self
    }
}

/// Failures on the streaming path
///
/// None of these reach the caller; each becomes an error entry in the store.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("Failed to decode frame: {0}")]
    Decode(#[from] DecodeError),
    #[error("Log stream transport error: {0}")]
    Transport(#[from] WsError),
    #[error("Log stream connection not established within {0:?}")]
    ConnectTimeout(Duration),
}

impl StreamError {
    /// Category tag for the diagnostic entry
    pub fn category(&self) -> &'static str {
        match self {
            StreamError::Decode(_) => "decode",
            StreamError::Transport(_) => "transport",
            StreamError::ConnectTimeout(_) => "timeout",
        }
    }

    /// Error-level entry describing this failure
    pub fn to_entry(&self) -> LogEntry {
        LogEntry::diagnostic_error(CONNECTION_SOURCE, self.to_string()).with_category(self.category())
    }
}

/// Current connection state plus a feed of every transition
#[derive(Debug)]
pub(crate) struct StateCell {
    current: watch::Sender<ConnectionState>,
    transitions: broadcast::Sender<ConnectionState>,
}

impl StateCell {
    pub(crate) fn new() -> Self {
        let (current, _) = watch::channel(ConnectionState::Disconnected);
        let (transitions, _) = broadcast::channel(64);
        Self {
            current,
            transitions,
        }
    }

    pub(crate) fn get(&self) -> ConnectionState {
        *self.current.borrow()
    }

    pub(crate) fn set(&self, next: ConnectionState) {
        let previous = self.current.send_replace(next);
        if previous == next {
            return;
        }

        tracing::info!(from = %previous, to = %next, "Connection state changed");
        set_gauge(
            GaugeMetric::StreamConnected,
            if next == ConnectionState::Connected { 1.0 } else { 0.0 },
        );
        let _ = self.transitions.send(next);
    }

    pub(crate) fn watch(&self) -> watch::Receiver<ConnectionState> {
        self.current.subscribe()
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<ConnectionState> {
        self.transitions.subscribe()
    }
}
