//! Out-of-band health checks against the log server

use super::types::{
    ProbeConfig, ProbeError, ServerStatus, TestTriggerRequest, DIAGNOSTICS_SOURCE, STATUS_PATH,
    TEST_TRIGGER_PATH,
};
use crate::entry::LogEntry;
use crate::ingest::IngestPipeline;
use crate::telemetry::{increment_counter, CounterMetric};
use reqwest::{Client, Response};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Request/response health probe, independent of the streaming connection
///
/// Results are reported as entries through the admission pipeline; nothing
/// here touches connection state.
pub struct DiagnosticsProbe {
    config: ProbeConfig,
    client: Client,
    pipeline: IngestPipeline,
}

impl DiagnosticsProbe {
    /// Create a probe that reports into `pipeline`
    pub fn new(config: ProbeConfig, pipeline: IngestPipeline) -> Result<Self, ProbeError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            config,
            client,
            pipeline,
        })
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Fetch the server's health report
    pub async fn fetch_status(&self) -> Result<ServerStatus, ProbeError> {
        let url = self.config.endpoint(STATUS_PATH);
        tracing::debug!(url = %url, "Fetching log server status");

        let response = self.client.get(&url).send().await?;
        let response = ensure_success(response).await?;
        Ok(response.json().await?)
    }

    /// Ask the server to emit `count` test entries on the stream
    pub async fn request_test_entries(&self, count: u32) -> Result<(), ProbeError> {
        let url = self.config.endpoint(TEST_TRIGGER_PATH);
        tracing::debug!(url = %url, count, "Triggering test log entries");

        let response = self
            .client
            .post(&url)
            .json(&TestTriggerRequest { count })
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    /// Run one health check and report the outcome as an entry
    pub async fn check_status(&self) -> Option<ServerStatus> {
        match self.fetch_status().await {
            Ok(status) => {
                self.pipeline
                    .ingest(LogEntry::diagnostic_info(DIAGNOSTICS_SOURCE, status.summary()));
                Some(status)
            }
            Err(e) => {
                self.report_failure("Status check failed", &e);
                None
            }
        }
    }

    /// Trigger test entries and report the outcome as an entry
    pub async fn trigger_test_entries(&self, count: u32) -> bool {
        match self.request_test_entries(count).await {
            Ok(()) => {
                self.pipeline.ingest(LogEntry::diagnostic_info(
                    DIAGNOSTICS_SOURCE,
                    format!("Requested {} test log entries", count),
                ));
                true
            }
            Err(e) => {
                self.report_failure("Test entry trigger failed", &e);
                false
            }
        }
    }

    /// Run the status check every `interval` until the handle is aborted
    pub fn spawn_polling(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                self.check_status().await;
            }
        })
    }

    fn report_failure(&self, what: &str, error: &ProbeError) {
        increment_counter(CounterMetric::ProbeFailures);
        tracing::warn!(error = %error, "{}", what);
        self.pipeline.ingest(LogEntry::diagnostic_error(
            DIAGNOSTICS_SOURCE,
            format!("{}: {}", what, error),
        ));
    }
}

async fn ensure_success(response: Response) -> Result<Response, ProbeError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ProbeError::Status {
        status: status.as_u16(),
        body,
    })
}
