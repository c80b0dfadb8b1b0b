//! Diagnostics probe types

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Source tag on entries the probe reports
pub const DIAGNOSTICS_SOURCE: &str = "diagnostics";

/// Health check path, relative to the base URL
pub const STATUS_PATH: &str = "/api/logs/status";

/// Test entry trigger path, relative to the base URL
pub const TEST_TRIGGER_PATH: &str = "/api/logs/test";

/// Configuration for the diagnostics probe
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Base URL of the log server's HTTP API
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

impl ProbeConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Join a path onto the base URL
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// Probe failures
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Request could not be sent or the body could not be read
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Server answered with a non-success status
    #[error("Log server error: {status} - {body}")]
    Status { status: u16, body: String },
}

/// Health report from the log server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerStatus {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub active_connections: Option<u64>,
    #[serde(default)]
    pub log_file: Option<String>,
    /// Fields this client does not know about
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ServerStatus {
    /// One-line human summary
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "Log server status: {}",
            self.status.as_deref().unwrap_or("unknown")
        );
        if let Some(n) = self.active_connections {
            summary.push_str(&format!(", {} active connection(s)", n));
        }
        if let Some(file) = &self.log_file {
            summary.push_str(&format!(", writing to {}", file));
        }
        summary
    }
}

/// Body of the test trigger request
#[derive(Debug, Clone, Serialize)]
pub(crate) struct TestTriggerRequest {
    pub count: u32,
}
