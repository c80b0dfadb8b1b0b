//! Diagnostics probe
//!
//! Polls the log server's HTTP API for health and can ask it to emit test
//! entries. Runs beside the stream, never through it.

mod probe;
mod types;

pub use probe::DiagnosticsProbe;
pub use types::{
    ProbeConfig, ProbeError, ServerStatus, DIAGNOSTICS_SOURCE, STATUS_PATH, TEST_TRIGGER_PATH,
};
