//! Integration tests for a full dashboard session

mod common;

use common::{log_frame, messages_from, spawn_server, unreachable_url, wait_until, ConnectionScript};
use opslog_stream::config::Config;
use opslog_stream::diagnostics::DIAGNOSTICS_SOURCE;
use opslog_stream::entry::{LogEntry, LogLevel};
use opslog_stream::query::FilterCriteria;
use opslog_stream::session::LogSession;
use opslog_stream::store::StoreEvent;
use opslog_stream::stream::ConnectionState;
use std::time::Duration;

fn config_for(url: &str) -> Config {
    let mut config = Config::default();
    config.stream.url = url.to_string();
    config.stream.reconnect_delay_ms = 100;
    config.stream.connect_timeout_ms = 2_000;
    config
}

#[tokio::test]
async fn test_session_filter_and_export() {
    let server = spawn_server(vec![ConnectionScript::send(vec![
        log_frame("INFO", "BTC feed started", "feed"),
        log_frame("ERROR", "Order rejected: insufficient BTC", "executor"),
        log_frame("WARNING", "spread wide", "executor"),
        log_frame("ERROR", "gamma timeout", "market"),
    ])])
    .await;

    let session = LogSession::new(config_for(&server.url)).unwrap();
    session.start();
    wait_until(|| messages_from(session.store(), "market").len() == 1).await;
    assert_eq!(session.connection_state(), ConnectionState::Connected);

    session.set_filter_criteria(FilterCriteria::all().level(LogLevel::Error).search("btc"));
    let filtered = session.filtered_entries();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].message, "Order rejected: insufficient BTC");

    session.set_filter_criteria(FilterCriteria::all().source("executor"));
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("export.json");
    let written = session.export_to_file(&path).unwrap();
    assert_eq!(written, 2);

    let exported: Vec<LogEntry> =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let messages: Vec<_> = exported.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(messages, vec!["Order rejected: insufficient BTC", "spread wide"]);

    session.stop(Some("done")).await;
    assert_eq!(session.connection_state(), ConnectionState::Disconnected);

    session.clear();
    assert!(session.filtered_entries().is_empty());
    assert!(session.store().is_empty());
}

#[tokio::test]
async fn test_session_notifies_subscribers() {
    let server = spawn_server(vec![ConnectionScript::send(vec![log_frame(
        "INFO", "tick processed", "strategy",
    )])])
    .await;

    let session = LogSession::new(config_for(&server.url)).unwrap();
    let mut events = session.subscribe();
    let mut states = session.subscribe_connection();
    session.start();

    let found = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if let Ok(StoreEvent::Appended { entry, .. }) = events.recv().await {
                if entry.source.as_deref() == Some("strategy") {
                    return entry;
                }
            }
        }
    })
    .await
    .unwrap();
    assert_eq!(found.message, "tick processed");

    let mut seen = Vec::new();
    while let Ok(state) = states.try_recv() {
        seen.push(state);
    }
    assert!(seen.contains(&ConnectionState::Connecting));
    assert!(seen.contains(&ConnectionState::Connected));

    session.stop(None).await;
}

#[tokio::test]
async fn test_session_polling_reports_probe_failures() {
    let mut config = config_for(&unreachable_url().await);
    let probe_url = unreachable_url().await;
    config.diagnostics.base_url = probe_url.replace("ws://", "http://").replace("/ws/logs", "");
    config.diagnostics.timeout_secs = 1;
    config.diagnostics.poll_interval_secs = Some(60);

    let session = LogSession::new(config).unwrap();
    session.start();

    wait_until(|| {
        session
            .store()
            .snapshot()
            .iter()
            .any(|e| e.source.as_deref() == Some(DIAGNOSTICS_SOURCE) && e.level == LogLevel::Error)
    })
    .await;

    session.stop(None).await;
    assert_eq!(session.connection_state(), ConnectionState::Disconnected);
}
