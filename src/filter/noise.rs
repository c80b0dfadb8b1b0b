//! Noise filtering

use crate::entry::{LogEntry, LogLevel};
use serde::{Deserialize, Serialize};

/// Message text the server uses for "nothing to say"
pub const PLACEHOLDER_MESSAGE: &str = "-";

/// Result of applying the noise filter to an entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterResult {
    /// Entry should be stored
    Pass,
    /// Entry rejected
    Reject(RejectReason),
}

impl FilterResult {
    pub fn is_pass(&self) -> bool {
        matches!(self, FilterResult::Pass)
    }
}

/// Reason for rejecting an entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// Message absent or blank
    EmptyMessage,
    /// Message is the placeholder sentinel
    Placeholder,
    /// Debug-level chatter matching a suppressed substring
    Noisy(String),
}

/// Configuration for the noise filter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Substrings that mark a debug entry as noise
    #[serde(default = "default_noisy_substrings")]
    pub noisy_substrings: Vec<String>,
}

fn default_noisy_substrings() -> Vec<String> {
    [
        "heartbeat",
        "ping",
        "pong",
        "keepalive",
        "polling",
        "GET /api/logs/status",
        "connection open",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            noisy_substrings: default_noisy_substrings(),
        }
    }
}

/// Admission control applied before an entry reaches the store
///
/// Stateless: the decision depends only on the entry and the configured
/// substrings.
#[derive(Debug, Clone, Default)]
pub struct NoiseFilter {
    config: FilterConfig,
}

impl NoiseFilter {
    /// Create a new noise filter with the given configuration
    pub fn new(config: FilterConfig) -> Self {
        let noisy_substrings = config
            .noisy_substrings
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect();
        Self {
            config: FilterConfig { noisy_substrings },
        }
    }

    /// Suppressed substrings in effect
    pub fn noisy_substrings(&self) -> &[String] {
        &self.config.noisy_substrings
    }

    /// Apply the admission rules in order, stopping at the first rejection
    pub fn evaluate(&self, entry: &LogEntry) -> FilterResult {
        let message = entry.message.trim();

        if message.is_empty() {
            return FilterResult::Reject(RejectReason::EmptyMessage);
        }

        if message == PLACEHOLDER_MESSAGE {
            return FilterResult::Reject(RejectReason::Placeholder);
        }

        if entry.level == LogLevel::Debug {
            if let Some(pattern) = self
                .config
                .noisy_substrings
                .iter()
                .find(|pattern| entry.message.contains(pattern.as_str()))
            {
                return FilterResult::Reject(RejectReason::Noisy(pattern.clone()));
            }
        }

        FilterResult::Pass
    }

    /// Boolean form of [`evaluate`](Self::evaluate)
    pub fn admit(&self, entry: &LogEntry) -> bool {
        self.evaluate(entry).is_pass()
    }
}
