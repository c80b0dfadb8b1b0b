//! Log entry model
//!
//! The immutable `LogEntry` record and the decoder that turns stream frames
//! into entries.

mod decode;
mod types;

pub use decode::{decode_frame, parse_timestamp, DecodeError};
pub use types::{LogEntry, LogLevel, Location};
