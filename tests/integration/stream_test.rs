//! Integration tests for the log stream against a real WebSocket server

mod common;

use common::{
    log_frame, messages_from, spawn_server, unreachable_url, wait_until, with_category,
    ConnectionScript,
};
use opslog_stream::entry::LogLevel;
use opslog_stream::filter::NoiseFilter;
use opslog_stream::ingest::IngestPipeline;
use opslog_stream::store::BoundedLogStore;
use opslog_stream::stream::{ConnectionManager, ConnectionState, StreamConfig, CONNECTION_SOURCE};
use opslog_stream::ws::{WsConfig, WsTransport, NORMAL_CLOSURE};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

fn manager_for(url: &str, store: &BoundedLogStore) -> ConnectionManager {
    let config = StreamConfig::new(url)
        .reconnect_delay(Duration::from_millis(100))
        .connect_timeout(Duration::from_secs(2));
    let pipeline = IngestPipeline::new(NoiseFilter::default(), store.clone());
    ConnectionManager::new(
        config,
        Arc::new(WsTransport::new(WsConfig::default())),
        pipeline,
    )
}

#[tokio::test]
async fn test_stream_ingests_filters_and_reconnects() {
    let mut server = spawn_server(vec![
        ConnectionScript::send(vec![
            log_frame("INFO", "order placed", "executor"),
            log_frame("DEBUG", "heartbeat ok", "monitor"),
            "not json".to_string(),
            r#"{"type":"status","data":{}}"#.to_string(),
            log_frame("ERROR", "fill rejected", "executor"),
        ])
        .then_close(1011),
        ConnectionScript::send(vec![log_frame("TRADE", "bought 10 YES", "executor")]),
    ])
    .await;

    let store = BoundedLogStore::default();
    let manager = manager_for(&server.url, &store);
    manager.start();

    wait_until(|| messages_from(&store, "executor").len() == 3).await;

    assert_eq!(
        messages_from(&store, "executor"),
        vec!["order placed", "fill rejected", "bought 10 YES"]
    );
    assert_eq!(server.connections.load(Ordering::SeqCst), 2);
    assert_eq!(manager.state(), ConnectionState::Connected);

    let snapshot = store.snapshot();
    assert!(snapshot.iter().all(|e| !e.message.contains("heartbeat")));

    let decode_errors = with_category(&snapshot, "decode");
    assert_eq!(decode_errors.len(), 1);
    assert_eq!(decode_errors[0].level, LogLevel::Error);

    let transport_errors = with_category(&snapshot, "transport");
    assert_eq!(transport_errors.len(), 1);
    assert!(transport_errors[0].message.contains("1011"));

    let trade = snapshot
        .iter()
        .find(|e| e.message == "bought 10 YES")
        .unwrap();
    assert_eq!(trade.level, LogLevel::Trade);
    assert_eq!(trade.timestamp.to_rfc3339(), "2024-05-01T12:00:00+00:00");

    manager.stop(Some("test finished")).await;
    assert_eq!(manager.state(), ConnectionState::Disconnected);

    let code = tokio::time::timeout(Duration::from_secs(5), server.client_closes.recv())
        .await
        .unwrap();
    assert_eq!(code, Some(NORMAL_CLOSURE));
}

#[tokio::test]
async fn test_normal_server_close_does_not_reconnect() {
    let server = spawn_server(vec![
        ConnectionScript::send(vec![log_frame("INFO", "shutting down", "bot")])
            .then_close(NORMAL_CLOSURE),
    ])
    .await;

    let store = BoundedLogStore::default();
    let manager = manager_for(&server.url, &store);
    let mut state = manager.watch_state();
    manager.start();

    wait_until(|| messages_from(&store, "bot") == vec!["shutting down"]).await;
    tokio::time::timeout(
        Duration::from_secs(5),
        state.wait_for(|s| *s == ConnectionState::Disconnected),
    )
    .await
    .unwrap()
    .unwrap();

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(server.connections.load(Ordering::SeqCst), 1);
    assert_eq!(manager.state(), ConnectionState::Disconnected);
    assert!(with_category(&store.snapshot(), "transport").is_empty());
}

#[tokio::test]
async fn test_unreachable_server_retries_until_stopped() {
    let url = unreachable_url().await;
    let store = BoundedLogStore::default();
    let manager = manager_for(&url, &store);
    manager.start();

    wait_until(|| with_category(&store.snapshot(), "transport").len() >= 2).await;
    for error in store.snapshot() {
        assert_eq!(error.level, LogLevel::Error);
        assert_eq!(error.source.as_deref(), Some(CONNECTION_SOURCE));
    }

    manager.stop(None).await;
    assert_eq!(manager.state(), ConnectionState::Disconnected);

    let after_stop = store.len();
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(store.len(), after_stop);
}
