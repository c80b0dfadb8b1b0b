//! Query layer over the bounded store
//!
//! Level, source and free-text filtering, plus JSON export of the result.

mod types;
mod view;

pub use types::{filter_entries, DisplayPolicy, FilterCriteria, LevelFilter, SourceFilter, ALL};
pub use view::{ExportError, QueryView};
