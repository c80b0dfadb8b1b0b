//! In-memory working set of admitted log entries

mod bounded;

use crate::entry::LogEntry;

pub use bounded::{BoundedLogStore, DEFAULT_CAPACITY};

/// Change notification sent to store observers
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    /// An entry was appended; `evicted` is set when the oldest one was dropped
    Appended {
        entry: LogEntry,
        len: usize,
        evicted: bool,
    },
    /// The store was emptied
    Cleared,
}
