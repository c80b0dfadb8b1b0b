//! Dashboard session: everything the rendering layer talks to

use crate::config::Config;
use crate::diagnostics::{DiagnosticsProbe, ProbeError};
use crate::entry::LogEntry;
use crate::filter::NoiseFilter;
use crate::ingest::IngestPipeline;
use crate::query::{DisplayPolicy, ExportError, FilterCriteria, QueryView};
use crate::store::{BoundedLogStore, StoreEvent};
use crate::stream::{ConnectionManager, ConnectionState};
use crate::ws::{Transport, WsConfig, WsTransport};
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

/// Owns one dashboard's pipeline from session start to session end
///
/// The connection manager and query view receive their configuration here
/// instead of reading process-wide state.
pub struct LogSession {
    config: Config,
    pipeline: IngestPipeline,
    manager: ConnectionManager,
    probe: Arc<DiagnosticsProbe>,
    view: RwLock<QueryView>,
    polling: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl LogSession {
    /// Build a session that streams over WebSocket
    pub fn new(config: Config) -> Result<Self, ProbeError> {
        let transport = WsTransport::new(WsConfig::default().ping_interval(config.stream.ping_interval()));
        Self::with_transport(config, Arc::new(transport))
    }

    /// Build a session on a custom transport
    pub fn with_transport(config: Config, transport: Arc<dyn Transport>) -> Result<Self, ProbeError> {
        let store = BoundedLogStore::new(config.store.capacity);
        let filter = NoiseFilter::new(config.filter.clone());
        let pipeline = IngestPipeline::new(filter, store.clone());

        let manager = ConnectionManager::new(
            config.stream.to_stream_config(),
            transport,
            pipeline.clone(),
        );
        let probe = DiagnosticsProbe::new(config.diagnostics.to_probe_config(), pipeline.clone())?;
        let view = QueryView::new(store, FilterCriteria::all());

        Ok(Self {
            config,
            pipeline,
            manager,
            probe: Arc::new(probe),
            view: RwLock::new(view),
            polling: std::sync::Mutex::new(None),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &BoundedLogStore {
        self.pipeline.store()
    }

    pub fn probe(&self) -> &DiagnosticsProbe {
        &self.probe
    }

    /// Connect the stream and, if configured, start status polling
    pub fn start(&self) {
        self.manager.start();

        if let Some(interval) = self.config.diagnostics.poll_interval() {
            let mut polling = self.polling.lock().unwrap_or_else(PoisonError::into_inner);
            if polling.as_ref().map_or(true, |h| h.is_finished()) {
                *polling = Some(Arc::clone(&self.probe).spawn_polling(interval));
            }
        }
    }

    /// Stop polling and close the stream
    pub async fn stop(&self, reason: Option<&str>) {
        let polling = self
            .polling
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = polling {
            handle.abort();
        }
        self.manager.stop(reason).await;
    }

    /// Store change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.store().subscribe()
    }

    /// Connection state transitions
    pub fn subscribe_connection(&self) -> broadcast::Receiver<ConnectionState> {
        self.manager.subscribe()
    }

    /// Current connection state as a watch
    pub fn watch_connection(&self) -> watch::Receiver<ConnectionState> {
        self.manager.watch_state()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.manager.state()
    }

    pub fn set_filter_criteria(&self, criteria: FilterCriteria) {
        self.view
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .set_criteria(criteria);
    }

    pub fn filter_criteria(&self) -> FilterCriteria {
        self.read_view(|view| view.criteria().clone())
    }

    /// Entries matching the current criteria, oldest first
    pub fn filtered_entries(&self) -> Vec<LogEntry> {
        self.read_view(QueryView::filtered_entries)
    }

    /// Filtered entries arranged for display
    pub fn display_entries(&self, policy: &DisplayPolicy) -> Vec<LogEntry> {
        policy.apply(&self.filtered_entries())
    }

    /// Empty the store
    pub fn clear(&self) {
        self.store().clear();
    }

    /// Current filtered view as JSON
    pub fn export_json(&self) -> Result<String, ExportError> {
        self.read_view(QueryView::export_json)
    }

    /// Write the current filtered view as JSON to `path`
    pub fn export_to_file(&self, path: impl AsRef<Path>) -> Result<usize, ExportError> {
        self.read_view(|view| view.export_to_file(path))
    }

    fn read_view<T>(&self, f: impl FnOnce(&QueryView) -> T) -> T {
        let view = self.view.read().unwrap_or_else(PoisonError::into_inner);
        f(&view)
    }
}

impl Drop for LogSession {
    fn drop(&mut self) {
        let polling = self
            .polling
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = polling {
            handle.abort();
        }
    }
}
