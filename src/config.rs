//! Configuration types for opslog-stream

use crate::diagnostics::ProbeConfig;
use crate::filter::FilterConfig;
use crate::store::DEFAULT_CAPACITY;
use crate::stream::StreamConfig;
use crate::telemetry::LogFormat;
use serde::Deserialize;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub stream: StreamSettings,
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub diagnostics: DiagnosticsSettings,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Log stream connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StreamSettings {
    /// WebSocket endpoint of the log server
    #[serde(default = "default_stream_url")]
    pub url: String,

    /// Fixed delay before each reconnect attempt (milliseconds)
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,

    /// Give up on a connection attempt after this long (milliseconds)
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Keepalive ping interval (seconds)
    #[serde(default = "default_ping_interval_secs")]
    pub ping_interval_secs: u64,
}

fn default_stream_url() -> String {
    "ws://127.0.0.1:8000/ws/logs".to_string()
}
fn default_reconnect_delay_ms() -> u64 {
    5_000
}
fn default_connect_timeout_ms() -> u64 {
    10_000
}
fn default_ping_interval_secs() -> u64 {
    30
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            url: default_stream_url(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            ping_interval_secs: default_ping_interval_secs(),
        }
    }
}

impl StreamSettings {
    pub fn to_stream_config(&self) -> StreamConfig {
        StreamConfig::new(&self.url)
            .reconnect_delay(Duration::from_millis(self.reconnect_delay_ms))
            .connect_timeout(Duration::from_millis(self.connect_timeout_ms))
    }

    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_secs.max(1))
    }
}

/// Working-set configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

/// Diagnostics probe configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DiagnosticsSettings {
    /// Base URL of the log server's HTTP API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Periodic status checks; disabled when absent
    #[serde(default)]
    pub poll_interval_secs: Option<u64>,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}
fn default_timeout_secs() -> u64 {
    5
}

impl Default for DiagnosticsSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            poll_interval_secs: None,
        }
    }
}

impl DiagnosticsSettings {
    pub fn to_probe_config(&self) -> ProbeConfig {
        ProbeConfig {
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    pub fn poll_interval(&self) -> Option<Duration> {
        self.poll_interval_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
