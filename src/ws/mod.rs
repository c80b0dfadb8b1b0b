//! WebSocket transport
//!
//! The connection manager talks to the log server through the `Transport`
//! seam so it never depends on a concrete socket implementation.

mod client;
mod types;

pub use client::{WsConnection, WsTransport};
pub use types::{TransportEvent, WsConfig, WsError, ABNORMAL_CLOSURE, NORMAL_CLOSURE};

use async_trait::async_trait;

/// Something that can open a connection to the log stream
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open a connection to `url`
    async fn open(&self, url: &str) -> Result<Box<dyn TransportStream>, WsError>;
}

/// An open connection delivering frames
#[async_trait]
pub trait TransportStream: Send {
    /// Wait for the next event
    ///
    /// Must be cancel-safe: the caller races it against timers and shutdown.
    async fn next_event(&mut self) -> TransportEvent;

    /// Close the connection with the given close code
    async fn close(&mut self, code: u16, reason: &str);
}
