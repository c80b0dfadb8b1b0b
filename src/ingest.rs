//! Admission pipeline: noise filter in front of the bounded store

use crate::entry::LogEntry;
use crate::filter::{FilterResult, NoiseFilter};
use crate::store::BoundedLogStore;
use crate::telemetry::{increment_counter, CounterMetric};
use std::sync::Arc;

/// Single entry point for anything that wants to add to the store
///
/// Both the stream connection and the diagnostics probe write through this,
/// so every entry, including self-reported diagnostics, is filtered the same
/// way.
#[derive(Clone, Debug)]
pub struct IngestPipeline {
    filter: Arc<NoiseFilter>,
    store: BoundedLogStore,
}

impl IngestPipeline {
    pub fn new(filter: NoiseFilter, store: BoundedLogStore) -> Self {
        Self {
            filter: Arc::new(filter),
            store,
        }
    }

    pub fn store(&self) -> &BoundedLogStore {
        &self.store
    }

    pub fn filter(&self) -> &NoiseFilter {
        &self.filter
    }

    /// Filter and store an entry; returns whether it was admitted
    pub fn ingest(&self, entry: LogEntry) -> bool {
        match self.filter.evaluate(&entry) {
            FilterResult::Pass => {
                self.store.append(entry);
                increment_counter(CounterMetric::EntriesAdmitted);
                true
            }
            FilterResult::Reject(reason) => {
                tracing::trace!(?reason, level = %entry.level, "Entry rejected");
                increment_counter(CounterMetric::EntriesRejected);
                false
            }
        }
    }
}
