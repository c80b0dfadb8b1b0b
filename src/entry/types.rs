//! Log entry types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a log entry
///
/// The set is closed; anything the server sends outside of it is kept as
/// `Other` so it can still be displayed and filtered on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
    Trade,
    /// Unrecognized level, raw value preserved
    Other(String),
}

impl LogLevel {
    /// Parse a level name, case-insensitively
    ///
    /// Unknown names are kept lowercased so they compare equal however the
    /// server or the user spelled them.
    pub fn parse(raw: &str) -> Self {
        let name = raw.trim().to_lowercase();
        match name.as_str() {
            "debug" => LogLevel::Debug,
            "info" => LogLevel::Info,
            "warning" | "warn" => LogLevel::Warning,
            "error" => LogLevel::Error,
            "critical" | "fatal" => LogLevel::Critical,
            "trade" => LogLevel::Trade,
            _ => LogLevel::Other(name),
        }
    }

    /// Canonical lowercase name used on the wire and in filters
    pub fn as_str(&self) -> &str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
            LogLevel::Critical => "critical",
            LogLevel::Trade => "trade",
            LogLevel::Other(raw) => raw,
        }
    }

    /// Whether this is one of the known levels
    pub fn is_known(&self) -> bool {
        !matches!(self, LogLevel::Other(_))
    }
}

impl From<String> for LogLevel {
    fn from(raw: String) -> Self {
        LogLevel::parse(&raw)
    }
}

impl From<LogLevel> for String {
    fn from(level: LogLevel) -> Self {
        level.as_str().to_string()
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARNING"),
            LogLevel::Error => write!(f, "ERROR"),
            LogLevel::Critical => write!(f, "CRITICAL"),
            LogLevel::Trade => write!(f, "TRADE"),
            LogLevel::Other(raw) if raw.is_empty() => write!(f, "UNKNOWN"),
            LogLevel::Other(raw) => write!(f, "{}", raw.to_uppercase()),
        }
    }
}

/// Code location that produced an entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub function: String,
    pub line: u32,
}

impl Location {
    /// Build a location only if every part is present
    pub fn from_parts(
        file: Option<String>,
        function: Option<String>,
        line: Option<u32>,
    ) -> Option<Self> {
        Some(Self {
            file: file?,
            function: function?,
            line: line?,
        })
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.function, self.line)
    }
}

/// A single observation from the log stream. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// When the event happened (substituted with receive time if malformed)
    pub timestamp: DateTime<Utc>,
    /// Original timestamp literal, kept only when it could not be parsed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_timestamp: Option<String>,
    pub level: LogLevel,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl LogEntry {
    /// Create an entry stamped with the current time
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            raw_timestamp: None,
            level,
            message: message.into(),
            source: None,
            category: None,
            location: None,
        }
    }

    /// Informational entry produced by this process rather than the server
    pub fn diagnostic_info(source: &str, message: impl Into<String>) -> Self {
        Self::new(LogLevel::Info, message).with_source(source)
    }

    /// Error entry produced by this process rather than the server
    pub fn diagnostic_error(source: &str, message: impl Into<String>) -> Self {
        Self::new(LogLevel::Error, message).with_source(source)
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// True if the timestamp was substituted because the input was malformed
    pub fn has_malformed_timestamp(&self) -> bool {
        self.raw_timestamp.is_some()
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:<8}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
            self.level.to_string()
        )?;
        if let Some(source) = &self.source {
            write!(f, " [{}]", source)?;
        }
        if let Some(category) = &self.category {
            write!(f, " ({})", category)?;
        }
        write!(f, " {}", self.message)?;
        if let Some(location) = &self.location {
            write!(f, " @ {}", location)?;
        }
        if let Some(raw) = &self.raw_timestamp {
            write!(f, " [bad timestamp: {:?}]", raw)?;
        }
        Ok(())
    }
}
