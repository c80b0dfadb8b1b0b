//! Prometheus metrics

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Entries that passed the noise filter
    EntriesAdmitted,
    /// Entries dropped by the noise filter
    EntriesRejected,
    /// Frames that failed to decode
    DecodeErrors,
    /// Reconnect attempts scheduled
    Reconnects,
    /// Diagnostics probe failures
    ProbeFailures,
}

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Entries currently held in the store
    StoreLen,
    /// 1 while the stream is connected, 0 otherwise
    StreamConnected,
}

fn counter_name(metric: CounterMetric) -> &'static str {
    match metric {
        CounterMetric::EntriesAdmitted => "opslog_entries_admitted_total",
        CounterMetric::EntriesRejected => "opslog_entries_rejected_total",
        CounterMetric::DecodeErrors => "opslog_decode_errors_total",
        CounterMetric::Reconnects => "opslog_reconnects_total",
        CounterMetric::ProbeFailures => "opslog_probe_failures_total",
    }
}

fn gauge_name(metric: GaugeMetric) -> &'static str {
    match metric {
        GaugeMetric::StoreLen => "opslog_store_len",
        GaugeMetric::StreamConnected => "opslog_stream_connected",
    }
}

/// Increment a counter by one
pub fn increment_counter(metric: CounterMetric) {
    metrics::counter!(counter_name(metric)).increment(1);
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    metrics::gauge!(gauge_name(metric)).set(value);
}
