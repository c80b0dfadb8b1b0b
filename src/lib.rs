//! opslog-stream: Real-time log stream client for the trading-bot dashboard
//!
//! This library provides the core components for:
//! - Decoding log frames pushed over WebSocket
//! - Dropping noise before it reaches the working set
//! - A bounded in-memory store of recent entries
//! - Supervised connection with fixed-delay reconnect
//! - Filtered views and JSON export
//! - HTTP health checks and test-entry triggers
//! - Structured logging and Prometheus metrics

pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod entry;
pub mod filter;
pub mod ingest;
pub mod query;
pub mod session;
pub mod store;
pub mod stream;
pub mod telemetry;
pub mod ws;
