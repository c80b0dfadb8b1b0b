//! WebSocket transport over tokio-tungstenite

use super::types::{TransportEvent, WsConfig, WsError, ABNORMAL_CLOSURE};
use super::{Transport, TransportStream};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::time::{Interval, MissedTickBehavior};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

/// Opens WebSocket connections with ping/pong keepalive
#[derive(Debug, Clone, Default)]
pub struct WsTransport {
    config: WsConfig,
}

impl WsTransport {
    /// Create a new transport with the given configuration
    pub fn new(config: WsConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn open(&self, url: &str) -> Result<Box<dyn TransportStream>, WsError> {
        tracing::info!(url = %url, "Connecting to WebSocket");

        let (ws_stream, _response) = connect_async(url)
            .await
            .map_err(|e| WsError::ConnectionFailed(e.to_string()))?;

        tracing::info!("WebSocket connected");

        let mut ping_interval = tokio::time::interval(self.config.ping_interval);
        ping_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately
        ping_interval.reset();

        Ok(Box::new(WsConnection {
            stream: ws_stream,
            ping_interval,
            waiting_for_pong: false,
            closed: false,
        }))
    }
}

/// A single open WebSocket connection
pub struct WsConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    ping_interval: Interval,
    waiting_for_pong: bool,
    closed: bool,
}

#[async_trait]
impl TransportStream for WsConnection {
    async fn next_event(&mut self) -> TransportEvent {
        if self.closed {
            return TransportEvent::Error("Connection already closed".into());
        }

        loop {
            tokio::select! {
                msg = self.stream.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => return TransportEvent::Text(text),
                        Some(Ok(Message::Binary(data))) => {
                            match String::from_utf8(data) {
                                Ok(text) => return TransportEvent::Text(text),
                                Err(_) => tracing::debug!("Ignoring non-UTF-8 binary frame"),
                            }
                        }
                        Some(Ok(Message::Ping(data))) => {
                            if let Err(e) = self.stream.send(Message::Pong(data)).await {
                                self.closed = true;
                                return TransportEvent::Error(WsError::SendFailed(e.to_string()).to_string());
                            }
                        }
                        Some(Ok(Message::Pong(_))) => {
                            self.waiting_for_pong = false;
                        }
                        Some(Ok(Message::Close(frame))) => {
                            tracing::info!("Received close frame");
                            self.closed = true;
                            let (code, reason) = match frame {
                                Some(frame) => (u16::from(frame.code), frame.reason.into_owned()),
                                None => (ABNORMAL_CLOSURE, String::new()),
                            };
                            return TransportEvent::Closed { code, reason };
                        }
                        Some(Ok(Message::Frame(_))) => {}
                        Some(Err(e)) => {
                            self.closed = true;
                            return TransportEvent::Error(e.to_string());
                        }
                        None => {
                            self.closed = true;
                            return TransportEvent::Closed {
                                code: ABNORMAL_CLOSURE,
                                reason: "Stream ended unexpectedly".into(),
                            };
                        }
                    }
                }

                _ = self.ping_interval.tick() => {
                    if self.waiting_for_pong {
                        self.closed = true;
                        return TransportEvent::Error("Pong timeout".into());
                    }
                    if let Err(e) = self.stream.send(Message::Ping(Vec::new())).await {
                        self.closed = true;
                        return TransportEvent::Error(WsError::SendFailed(e.to_string()).to_string());
                    }
                    self.waiting_for_pong = true;
                }
            }
        }
    }

    async fn close(&mut self, code: u16, reason: &str) {
        if self.closed {
            return;
        }
        self.closed = true;

        let frame = CloseFrame {
            code: CloseCode::from(code),
            reason: reason.to_string().into(),
        };
        if let Err(e) = self.stream.close(Some(frame)).await {
            tracing::debug!(error = %e, "Error while closing WebSocket");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_ws_transport_with_config() {
        let transport = WsTransport::new(WsConfig::default().ping_interval(Duration::from_secs(15)));
        assert_eq!(transport.config.ping_interval, Duration::from_secs(15));
    }

    #[tokio::test]
    async fn test_open_connection_failure() {
        let transport = WsTransport::default();
        let result = tokio::time::timeout(
            Duration::from_secs(5),
            transport.open("ws://127.0.0.1:1/ws/logs"),
        )
        .await
        .expect("Test timed out");

        assert!(matches!(result, Err(WsError::ConnectionFailed(_))));
    }
}
