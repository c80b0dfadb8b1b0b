//! Query criteria and display policy

use crate::entry::{LogEntry, LogLevel};
use std::convert::Infallible;
use std::str::FromStr;

/// Keyword meaning "do not filter on this field"
pub const ALL: &str = "all";

/// Level restriction
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LevelFilter {
    #[default]
    All,
    Only(LogLevel),
}

impl LevelFilter {
    pub fn matches(&self, entry: &LogEntry) -> bool {
        match self {
            LevelFilter::All => true,
            LevelFilter::Only(level) => entry.level == *level,
        }
    }
}

impl FromStr for LevelFilter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case(ALL) {
            Ok(LevelFilter::All)
        } else {
            Ok(LevelFilter::Only(LogLevel::parse(s)))
        }
    }
}

/// Source restriction
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SourceFilter {
    #[default]
    All,
    Only(String),
}

impl SourceFilter {
    pub fn matches(&self, entry: &LogEntry) -> bool {
        match self {
            SourceFilter::All => true,
            SourceFilter::Only(source) => entry.source.as_deref() == Some(source.as_str()),
        }
    }
}

impl FromStr for SourceFilter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case(ALL) {
            Ok(SourceFilter::All)
        } else {
            Ok(SourceFilter::Only(s.to_string()))
        }
    }
}

/// What the viewer currently wants to see
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterCriteria {
    pub level: LevelFilter,
    pub source: SourceFilter,
    /// Case-insensitive substring searched in message, source and category
    pub search: String,
}

impl FilterCriteria {
    /// Criteria that match everything
    pub fn all() -> Self {
        Self::default()
    }

    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = LevelFilter::Only(level);
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = SourceFilter::Only(source.into());
        self
    }

    pub fn search(mut self, query: impl Into<String>) -> Self {
        self.search = query.into();
        self
    }

    /// Whether an entry passes level, source and search in that order
    pub fn matches(&self, entry: &LogEntry) -> bool {
        self.level.matches(entry)
            && self.source.matches(entry)
            && matches_search(entry, &self.search.to_lowercase())
    }
}

/// `needle` must already be lowercase
fn matches_search(entry: &LogEntry, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }

    let contains = |field: &str| field.to_lowercase().contains(needle);
    contains(&entry.message)
        || entry.source.as_deref().is_some_and(contains)
        || entry.category.as_deref().is_some_and(contains)
}

/// Apply criteria to a sequence, preserving order
pub fn filter_entries<'a>(
    entries: impl IntoIterator<Item = &'a LogEntry>,
    criteria: &FilterCriteria,
) -> Vec<LogEntry> {
    let needle = criteria.search.to_lowercase();
    entries
        .into_iter()
        .filter(|e| criteria.level.matches(e) && criteria.source.matches(e))
        .filter(|e| matches_search(e, &needle))
        .cloned()
        .collect()
}

/// Presentation rule layered over a filtered result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayPolicy {
    /// Show the most recent entry first
    pub newest_first: bool,
    /// Keep at most this many of the most recent entries
    pub limit: usize,
}

impl Default for DisplayPolicy {
    fn default() -> Self {
        Self {
            newest_first: true,
            limit: 100,
        }
    }
}

impl DisplayPolicy {
    /// Keep the `limit` most recent entries, optionally newest first
    pub fn apply(&self, entries: &[LogEntry]) -> Vec<LogEntry> {
        let start = entries.len().saturating_sub(self.limit);
        let mut recent = entries[start..].to_vec();
        if self.newest_first {
            recent.reverse();
        }
        recent
    }
}
