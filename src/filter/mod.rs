//! Admission control
//!
//! Decides whether a decoded entry is worth a slot in the bounded store.

mod noise;

pub use noise::{FilterConfig, FilterResult, NoiseFilter, RejectReason, PLACEHOLDER_MESSAGE};
