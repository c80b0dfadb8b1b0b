//! Shared helpers for integration tests: a scripted WebSocket log server

#![allow(dead_code)]

use futures_util::{SinkExt, StreamExt};
use opslog_stream::entry::LogEntry;
use opslog_stream::store::BoundedLogStore;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;

/// What the server does on one accepted connection
pub struct ConnectionScript {
    pub frames: Vec<String>,
    /// Close with this code after the frames; hold the socket open when `None`
    pub close_with: Option<u16>,
}

impl ConnectionScript {
    pub fn send(frames: Vec<String>) -> Self {
        Self {
            frames,
            close_with: None,
        }
    }

    pub fn then_close(mut self, code: u16) -> Self {
        self.close_with = Some(code);
        self
    }
}

pub struct TestServer {
    pub url: String,
    pub connections: Arc<AtomicUsize>,
    /// Close codes received from the client
    pub client_closes: mpsc::UnboundedReceiver<u16>,
}

/// Serve connections in order, one script each
pub async fn spawn_server(scripts: Vec<ConnectionScript>) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let connections = Arc::new(AtomicUsize::new(0));
    let (close_tx, client_closes) = mpsc::unbounded_channel();

    let counter = Arc::clone(&connections);
    tokio::spawn(async move {
        let mut scripts: VecDeque<_> = scripts.into();
        while let Ok((tcp, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            let script = scripts
                .pop_front()
                .unwrap_or_else(|| ConnectionScript::send(Vec::new()));
            let close_tx = close_tx.clone();

            tokio::spawn(async move {
                let Ok(mut ws) = tokio_tungstenite::accept_async(tcp).await else {
                    return;
                };
                for frame in script.frames {
                    if ws.send(Message::Text(frame)).await.is_err() {
                        return;
                    }
                }
                if let Some(code) = script.close_with {
                    let _ = ws
                        .close(Some(CloseFrame {
                            code: CloseCode::from(code),
                            reason: "scripted close".into(),
                        }))
                        .await;
                }
                while let Some(Ok(msg)) = ws.next().await {
                    if let Message::Close(Some(frame)) = msg {
                        let _ = close_tx.send(u16::from(frame.code));
                    }
                }
            });
        }
    });

    TestServer {
        url: format!("ws://{}/ws/logs", addr),
        connections,
        client_closes,
    }
}

/// Address nothing is listening on
pub async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("ws://{}/ws/logs", addr)
}

pub fn log_frame(level: &str, message: &str, source: &str) -> String {
    serde_json::json!({
        "type": "log",
        "data": {
            "timestamp": "2024-05-01T12:00:00Z",
            "level": level,
            "message": message,
            "source": source,
        }
    })
    .to_string()
}

/// Poll `condition` until it holds, failing after five seconds
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not met within 5s"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

pub fn messages_from(store: &BoundedLogStore, source: &str) -> Vec<String> {
    store
        .snapshot()
        .into_iter()
        .filter(|e| e.source.as_deref() == Some(source))
        .map(|e| e.message)
        .collect()
}

pub fn with_category<'a>(entries: &'a [LogEntry], category: &str) -> Vec<&'a LogEntry> {
    entries
        .iter()
        .filter(|e| e.category.as_deref() == Some(category))
        .collect()
}
