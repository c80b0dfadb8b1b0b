//! Integration tests for the shipped example configuration

use opslog_stream::config::Config;
use opslog_stream::filter::FilterConfig;
use opslog_stream::telemetry::LogFormat;
use std::time::Duration;

const EXAMPLE: &str = include_str!("../../config.toml.example");

#[test]
fn test_example_config_parses() {
    let config: Config = toml::from_str(EXAMPLE).unwrap();
    assert_eq!(config.stream.url, "ws://127.0.0.1:8000/ws/logs");
    assert_eq!(config.store.capacity, 1000);
    assert_eq!(config.telemetry.log_format, LogFormat::Pretty);
    assert!(config.diagnostics.poll_interval().is_none());
}

#[test]
fn test_example_matches_defaults() {
    let example: Config = toml::from_str(EXAMPLE).unwrap();
    let defaults = Config::default();

    assert_eq!(example.stream.url, defaults.stream.url);
    assert_eq!(
        example.stream.to_stream_config().reconnect_delay,
        Duration::from_secs(5)
    );
    assert_eq!(
        example.stream.to_stream_config().connect_timeout,
        Duration::from_secs(10)
    );
    assert_eq!(example.stream.ping_interval(), defaults.stream.ping_interval());
    assert_eq!(example.store.capacity, defaults.store.capacity);
    assert_eq!(
        example.filter.noisy_substrings,
        FilterConfig::default().noisy_substrings
    );
    assert_eq!(example.diagnostics.base_url, defaults.diagnostics.base_url);
    assert_eq!(example.telemetry.log_level, defaults.telemetry.log_level);
}
