//! Fixed-capacity log store with oldest-first eviction

use super::StoreEvent;
use crate::entry::LogEntry;
use crate::telemetry::{set_gauge, GaugeMetric};
use std::collections::VecDeque;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::broadcast;

/// Default number of entries retained
pub const DEFAULT_CAPACITY: usize = 1000;

/// Notification channel depth per observer
const EVENT_CHANNEL_CAPACITY: usize = 1024;

struct Inner {
    entries: RwLock<VecDeque<LogEntry>>,
    capacity: usize,
    events: broadcast::Sender<StoreEvent>,
}

/// Holds the most recent `capacity` admitted entries in arrival order
///
/// Cloning is cheap and yields another handle to the same store. Appends and
/// snapshots are mutually exclusive, so a reader never sees more than
/// `capacity` entries or a half-applied append.
#[derive(Clone)]
pub struct BoundedLogStore {
    inner: Arc<Inner>,
}

impl BoundedLogStore {
    /// Create an empty store holding at most `capacity` entries
    ///
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                entries: RwLock::new(VecDeque::with_capacity(capacity)),
                capacity,
                events,
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    pub fn len(&self) -> usize {
        self.read(|entries| entries.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append an entry, evicting the oldest one first if the store is full
    ///
    /// Observers are notified under the write lock, so notifications arrive
    /// in store order even with several writers.
    pub fn append(&self, entry: LogEntry) {
        let notification = (self.inner.events.receiver_count() > 0).then(|| entry.clone());
        let mut entries = self
            .inner
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let evicted = if entries.len() >= self.inner.capacity {
            entries.pop_front().is_some()
        } else {
            false
        };
        entries.push_back(entry);
        let len = entries.len();

        if let Some(entry) = notification {
            let _ = self
                .inner
                .events
                .send(StoreEvent::Appended { entry, len, evicted });
        }
        drop(entries);

        set_gauge(GaugeMetric::StoreLen, len as f64);
    }

    /// Remove every entry
    pub fn clear(&self) {
        let mut entries = self
            .inner
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        entries.clear();
        let _ = self.inner.events.send(StoreEvent::Cleared);
        drop(entries);

        set_gauge(GaugeMetric::StoreLen, 0.0);
    }

    /// Point-in-time copy of the contents, oldest first
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.read(|entries| entries.iter().cloned().collect())
    }

    /// The most recently appended entry
    pub fn last(&self) -> Option<LogEntry> {
        self.read(|entries| entries.back().cloned())
    }

    /// Receive a notification after every append and clear
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.inner.events.subscribe()
    }

    fn read<T>(&self, f: impl FnOnce(&VecDeque<LogEntry>) -> T) -> T {
        let entries = self
            .inner
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        f(&entries)
    }
}

impl Default for BoundedLogStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl std::fmt::Debug for BoundedLogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedLogStore")
            .field("capacity", &self.inner.capacity)
            .field("len", &self.len())
            .finish()
    }
}
