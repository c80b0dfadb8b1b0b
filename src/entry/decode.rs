//! Stream frame decoding

use super::{LogEntry, LogLevel, Location};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// Naive timestamp layouts accepted in addition to RFC 3339, read as UTC
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

/// Frame decoding errors
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Frame is not valid JSON or does not match the envelope shape
    #[error("Malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Inbound envelope
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Envelope {
    Log {
        data: WireEntry,
    },
    Connection {
        #[serde(default)]
        message: Option<String>,
        #[serde(default)]
        timestamp: Option<String>,
    },
    #[serde(other)]
    Unknown,
}

/// Log record as the server sends it
#[derive(Debug, Deserialize)]
struct WireEntry {
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    level: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    file: Option<String>,
    #[serde(default)]
    function: Option<String>,
    #[serde(default, deserialize_with = "lenient_line")]
    line: Option<u32>,
}

/// Line numbers arrive either as numbers or numeric strings
fn lenient_line<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Decode a text frame into a log entry
///
/// Returns `Ok(None)` for well-formed envelopes of a type this pipeline does
/// not handle.
pub fn decode_frame(text: &str) -> Result<Option<LogEntry>, DecodeError> {
    let envelope: Envelope = serde_json::from_str(text)?;

    let entry = match envelope {
        Envelope::Log { data } => Some(data.into_entry()),
        Envelope::Connection { message, timestamp } => {
            let (timestamp, raw_timestamp) = parse_timestamp(timestamp.as_deref());
            Some(LogEntry {
                timestamp,
                raw_timestamp,
                level: LogLevel::Info,
                message: message.unwrap_or_default(),
                source: Some("connection".to_string()),
                category: None,
                location: None,
            })
        }
        Envelope::Unknown => {
            tracing::trace!("Ignoring frame with unhandled type");
            None
        }
    };

    Ok(entry)
}

impl WireEntry {
    fn into_entry(self) -> LogEntry {
        let (timestamp, raw_timestamp) = parse_timestamp(self.timestamp.as_deref());
        LogEntry {
            timestamp,
            raw_timestamp,
            level: LogLevel::parse(self.level.as_deref().unwrap_or_default()),
            message: self.message.unwrap_or_default(),
            source: self.source,
            category: self.category,
            location: Location::from_parts(self.file, self.function, self.line),
        }
    }
}

/// Parse a timestamp literal
///
/// Absent or blank input yields the current time. Unparseable input also
/// yields the current time, and the literal is returned alongside so it is
/// never silently lost.
pub fn parse_timestamp(raw: Option<&str>) -> (DateTime<Utc>, Option<String>) {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return (Utc::now(), None);
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return (dt.with_timezone(&Utc), None);
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return (naive.and_utc(), None);
        }
    }

    tracing::warn!(timestamp = raw, "Malformed timestamp, substituting receive time");
    (Utc::now(), Some(raw.to_string()))
}
