//! Log stream connection manager with automatic reconnection

use super::types::{ConnectionState, StateCell, StreamConfig, StreamError, CONNECTION_SOURCE};
use crate::entry::{decode_frame, LogEntry};
use crate::ingest::IngestPipeline;
use crate::telemetry::{increment_counter, CounterMetric};
use crate::ws::{Transport, TransportEvent, TransportStream, WsError, NORMAL_CLOSURE};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};

/// Reason sent with the close frame when the caller gives none
const DEFAULT_STOP_REASON: &str = "client shutdown";

/// Handle to the running supervisor task
struct Worker {
    shutdown: watch::Sender<Option<String>>,
    /// Bumped by `start()` to end an idle or reconnect wait early
    wake: watch::Sender<()>,
    handle: JoinHandle<()>,
}

/// Owns the log stream connection and keeps it alive
///
/// A single supervisor task holds the transport and both timers (connect
/// timeout and reconnect delay), so there is never more than one open
/// connection and never more than one pending reconnect.
pub struct ConnectionManager {
    config: StreamConfig,
    transport: Arc<dyn Transport>,
    pipeline: IngestPipeline,
    state: Arc<StateCell>,
    worker: Mutex<Option<Worker>>,
}

impl ConnectionManager {
    /// Create a manager in the `Disconnected` state
    pub fn new(config: StreamConfig, transport: Arc<dyn Transport>, pipeline: IngestPipeline) -> Self {
        Self {
            config,
            transport,
            pipeline,
            state: Arc::new(StateCell::new()),
            worker: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Current connection state
    pub fn state(&self) -> ConnectionState {
        self.state.get()
    }

    /// Watch the current connection state
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.watch()
    }

    /// Receive every state transition
    pub fn subscribe(&self) -> broadcast::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Start streaming
    ///
    /// No-op while `Connecting` or `Connected`. From any other state the
    /// connection is opened right away, cutting short a pending reconnect
    /// delay. Must be called from within a tokio runtime.
    pub fn start(&self) {
        let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(running) = worker.as_ref().filter(|w| !w.handle.is_finished()) {
            match self.state.get() {
                ConnectionState::Connecting | ConnectionState::Connected => {
                    tracing::debug!("Log stream already running, ignoring start");
                }
                state => {
                    tracing::debug!(%state, "Waking log stream supervisor");
                    running.wake.send_replace(());
                }
            }
            return;
        }

        self.state.set(ConnectionState::Connecting);

        let (shutdown_tx, shutdown_rx) = watch::channel(None);
        let (wake_tx, wake_rx) = watch::channel(());
        let supervisor = Supervisor {
            config: self.config.clone(),
            transport: Arc::clone(&self.transport),
            pipeline: self.pipeline.clone(),
            state: Arc::clone(&self.state),
            shutdown: shutdown_rx,
            wake: wake_rx,
        };
        let handle = tokio::spawn(supervisor.run());

        *worker = Some(Worker {
            shutdown: shutdown_tx,
            wake: wake_tx,
            handle,
        });
    }

    /// Stop streaming and wait for the connection to close
    ///
    /// Cancels any pending reconnect or connect timeout. Always succeeds and
    /// leaves the manager `Disconnected`.
    pub async fn stop(&self, reason: Option<&str>) {
        let worker = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        let Some(worker) = worker else {
            self.state.set(ConnectionState::Disconnected);
            return;
        };

        let reason = reason.unwrap_or(DEFAULT_STOP_REASON).to_string();
        let _ = worker.shutdown.send(Some(reason));

        if let Err(e) = worker.handle.await {
            tracing::error!(error = %e, "Log stream supervisor ended abnormally");
        }
        self.state.set(ConnectionState::Disconnected);
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        let worker = self
            .worker
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(worker) = worker {
            let _ = worker.shutdown.send(Some(DEFAULT_STOP_REASON.to_string()));
        }
    }
}

/// How a connected session ended
enum SessionEnd {
    /// Caller asked to stop
    Shutdown,
    /// Server closed with the normal closure code
    ClosedNormally,
    /// Anything else; triggers a reconnect
    Failed(StreamError),
}

/// State owned by the supervisor task
struct Supervisor {
    config: StreamConfig,
    transport: Arc<dyn Transport>,
    pipeline: IngestPipeline,
    state: Arc<StateCell>,
    shutdown: watch::Receiver<Option<String>>,
    wake: watch::Receiver<()>,
}

impl Supervisor {
    async fn run(mut self) {
        loop {
            self.state.set(ConnectionState::Connecting);

            let opened = tokio::select! {
                biased;
                reason = shutdown_requested(&mut self.shutdown) => {
                    self.finish_shutdown(None, &reason).await;
                    return;
                }
                result = timeout(self.config.connect_timeout, self.transport.open(&self.config.url)) => result,
            };

            let end = match opened {
                Ok(Ok(stream)) => self.run_session(stream).await,
                Ok(Err(e)) => SessionEnd::Failed(StreamError::Transport(e)),
                // Dropping the open future tears down the half-open socket
                Err(_) => SessionEnd::Failed(StreamError::ConnectTimeout(self.config.connect_timeout)),
            };

            match end {
                SessionEnd::Shutdown => return,
                SessionEnd::ClosedNormally => {
                    // Only a start() that sees the state published below may
                    // end the wait
                    self.wake.borrow_and_update();
                    self.pipeline.ingest(LogEntry::diagnostic_info(
                        CONNECTION_SOURCE,
                        "Log stream closed by server",
                    ));
                    self.state.set(ConnectionState::Disconnected);

                    // Idle until started again
                    tokio::select! {
                        biased;
                        reason = shutdown_requested(&mut self.shutdown) => {
                            self.finish_shutdown(None, &reason).await;
                            return;
                        }
                        _ = self.wake.changed() => {}
                    }
                }
                SessionEnd::Failed(error) => {
                    self.wake.borrow_and_update();
                    tracing::warn!(error = %error, "Log stream connection lost");
                    self.pipeline.ingest(error.to_entry());
                    self.state.set(ConnectionState::Failed);
                    self.state.set(ConnectionState::Disconnected);

                    increment_counter(CounterMetric::Reconnects);
                    tracing::info!(
                        delay_ms = self.config.reconnect_delay.as_millis() as u64,
                        "Scheduling log stream reconnect"
                    );

                    tokio::select! {
                        biased;
                        reason = shutdown_requested(&mut self.shutdown) => {
                            self.finish_shutdown(None, &reason).await;
                            return;
                        }
                        _ = sleep(self.config.reconnect_delay) => {}
                        _ = self.wake.changed() => {
                            tracing::info!("Reconnecting early on start request");
                        }
                    }
                }
            }
        }
    }

    /// Pump frames from an open connection until it ends
    async fn run_session(&mut self, mut stream: Box<dyn TransportStream>) -> SessionEnd {
        self.state.set(ConnectionState::Connected);
        self.pipeline.ingest(LogEntry::diagnostic_info(
            CONNECTION_SOURCE,
            format!("Connected to log stream at {}", self.config.url),
        ));

        loop {
            tokio::select! {
                biased;
                reason = shutdown_requested(&mut self.shutdown) => {
                    self.finish_shutdown(Some(stream.as_mut()), &reason).await;
                    return SessionEnd::Shutdown;
                }
                event = stream.next_event() => match event {
                    TransportEvent::Text(text) => self.handle_frame(&text),
                    TransportEvent::Closed { code, reason } if code == NORMAL_CLOSURE => {
                        tracing::info!(reason = %reason, "Log stream closed normally");
                        return SessionEnd::ClosedNormally;
                    }
                    TransportEvent::Closed { code, reason } => {
                        return SessionEnd::Failed(WsError::Closed { code, reason }.into());
                    }
                    TransportEvent::Error(message) => {
                        return SessionEnd::Failed(WsError::ConnectionFailed(message).into());
                    }
                },
            }
        }
    }

    fn handle_frame(&self, text: &str) {
        match decode_frame(text) {
            Ok(Some(entry)) => {
                self.pipeline.ingest(entry);
            }
            Ok(None) => {}
            Err(e) => {
                increment_counter(CounterMetric::DecodeErrors);
                tracing::warn!(error = %e, "Dropping undecodable frame");
                self.pipeline.ingest(StreamError::from(e).to_entry());
            }
        }
    }

    async fn finish_shutdown(&self, stream: Option<&mut dyn TransportStream>, reason: &str) {
        self.state.set(ConnectionState::Closing);
        if let Some(stream) = stream {
            stream.close(NORMAL_CLOSURE, reason).await;
        }
        tracing::info!(reason = %reason, "Log stream stopped");
        self.state.set(ConnectionState::Disconnected);
    }
}

/// Resolves once a stop has been requested or the manager is gone
async fn shutdown_requested(rx: &mut watch::Receiver<Option<String>>) -> String {
    match rx.wait_for(Option::is_some).await {
        Ok(reason) => reason.clone().unwrap_or_default(),
        Err(_) => DEFAULT_STOP_REASON.to_string(),
    }
}
