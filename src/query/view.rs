//! Filtered projection over the bounded store

use super::types::{filter_entries, FilterCriteria};
use crate::entry::LogEntry;
use crate::store::BoundedLogStore;
use std::path::Path;
use thiserror::Error;

/// Export errors
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to serialize entries: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Failed to write export file: {0}")]
    Io(#[from] std::io::Error),
}

/// Derives the filtered, arrival-ordered view of a store on demand
///
/// Holds no copy of the data; every call works on a fresh snapshot, so the
/// same store contents and criteria always give the same result.
#[derive(Debug, Clone)]
pub struct QueryView {
    store: BoundedLogStore,
    criteria: FilterCriteria,
}

impl QueryView {
    pub fn new(store: BoundedLogStore, criteria: FilterCriteria) -> Self {
        Self { store, criteria }
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
    }

    /// Entries matching the current criteria, oldest first
    pub fn filtered_entries(&self) -> Vec<LogEntry> {
        let snapshot = self.store.snapshot();
        filter_entries(&snapshot, &self.criteria)
    }

    /// Filtered view as a pretty-printed JSON array
    pub fn export_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(&self.filtered_entries())?)
    }

    /// Write the filtered view as JSON to `path`
    pub fn export_to_file(&self, path: impl AsRef<Path>) -> Result<usize, ExportError> {
        let entries = self.filtered_entries();
        let json = serde_json::to_string_pretty(&entries)?;
        std::fs::write(path, json)?;
        Ok(entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::LogLevel;
    use tempfile::TempDir;

    fn populated_store() -> BoundedLogStore {
        let store = BoundedLogStore::new(100);
        store.append(LogEntry::new(LogLevel::Info, "Bot started").with_source("main"));
        store.append(
            LogEntry::new(LogLevel::Trade, "Bought 0.1 BTC")
                .with_source("executor")
                .with_category("orders"),
        );
        store.append(LogEntry::new(LogLevel::Error, "Order rejected").with_source("executor"));
        store.append(LogEntry::new(LogLevel::Warning, "Slippage high").with_category("risk"));
        store
    }

    #[test]
    fn test_all_criteria_returns_snapshot() {
        let store = populated_store();
        let view = QueryView::new(store.clone(), FilterCriteria::all());
        assert_eq!(view.filtered_entries(), store.snapshot());
    }

    #[test]
    fn test_search_subset() {
        let view = QueryView::new(populated_store(), FilterCriteria::all().search("ORDER"));
        let messages: Vec<_> = view.filtered_entries().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["Bought 0.1 BTC", "Order rejected"]);
    }

    #[test]
    fn test_combined_criteria() {
        let criteria = FilterCriteria::all()
            .level(LogLevel::Error)
            .source("executor")
            .search("rejected");
        let view = QueryView::new(populated_store(), criteria);
        assert_eq!(view.filtered_entries().len(), 1);
    }

    #[test]
    fn test_no_match_is_empty() {
        let view = QueryView::new(populated_store(), FilterCriteria::all().search("ethereum"));
        assert!(view.filtered_entries().is_empty());
    }

    #[test]
    fn test_empty_store_is_empty() {
        let view = QueryView::new(BoundedLogStore::new(10), FilterCriteria::all());
        assert!(view.filtered_entries().is_empty());
    }

    #[test]
    fn test_view_follows_store_changes() {
        let store = populated_store();
        let mut view = QueryView::new(store.clone(), FilterCriteria::all());
        assert_eq!(view.filtered_entries().len(), 4);

        store.append(LogEntry::new(LogLevel::Critical, "Exchange down"));
        assert_eq!(view.filtered_entries().len(), 5);

        view.set_criteria(FilterCriteria::all().level(LogLevel::Critical));
        assert_eq!(view.filtered_entries().len(), 1);

        store.clear();
        assert!(view.filtered_entries().is_empty());
    }

    #[test]
    fn test_deterministic() {
        let view = QueryView::new(populated_store(), FilterCriteria::all().search("o"));
        assert_eq!(view.filtered_entries(), view.filtered_entries());
    }

    #[test]
    fn test_export_json() {
        let view = QueryView::new(populated_store(), FilterCriteria::all().level(LogLevel::Trade));
        let json = view.export_json().unwrap();
        let parsed: Vec<LogEntry> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].level, LogLevel::Trade);
        assert_eq!(parsed[0].category.as_deref(), Some("orders"));
        assert!(json.contains("\"level\": \"trade\""));
    }

    #[test]
    fn test_export_to_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logs.json");
        let view = QueryView::new(populated_store(), FilterCriteria::all());

        let count = view.export_to_file(&path).unwrap();
        assert_eq!(count, 4);

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<LogEntry> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.len(), 4);
    }

    #[test]
    fn test_export_to_missing_dir_fails() {
        let view = QueryView::new(populated_store(), FilterCriteria::all());
        let result = view.export_to_file("/nonexistent/dir/logs.json");
        assert!(matches!(result, Err(ExportError::Io(_))));
    }
}
