//! Tail command implementation

use crate::config::Config;
use crate::query::{FilterCriteria, LevelFilter, SourceFilter};
use crate::session::LogSession;
use crate::store::StoreEvent;
use clap::Args;
use std::path::PathBuf;
use tokio::sync::broadcast::error::RecvError;

#[derive(Args, Debug)]
pub struct TailArgs {
    /// Only show this level ("all" for every level)
    #[arg(long, default_value = "all")]
    pub level: String,

    /// Only show this source ("all" for every source)
    #[arg(long, default_value = "all")]
    pub source: String,

    /// Case-insensitive text to look for in message, source or category
    #[arg(long, default_value = "")]
    pub search: String,

    /// Write the filtered view to this JSON file on exit
    #[arg(long)]
    pub export: Option<PathBuf>,
}

impl TailArgs {
    pub fn criteria(&self) -> FilterCriteria {
        let level: LevelFilter = match self.level.parse() {
            Ok(level) => level,
            Err(never) => match never {},
        };
        let source: SourceFilter = match self.source.parse() {
            Ok(source) => source,
            Err(never) => match never {},
        };
        FilterCriteria {
            level,
            source,
            search: self.search.clone(),
        }
    }

    pub async fn execute(&self, config: Config) -> anyhow::Result<()> {
        let criteria = self.criteria();
        let session = LogSession::new(config)?;
        session.set_filter_criteria(criteria.clone());

        let mut entries = session.subscribe();
        let mut states = session.subscribe_connection();

        tracing::info!(url = %session.config().stream.url, "Tailing log stream");
        session.start();

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Interrupted, stopping");
                    break;
                }
                event = entries.recv() => match event {
                    Ok(StoreEvent::Appended { entry, .. }) => {
                        if criteria.matches(&entry) {
                            println!("{}", entry);
                        }
                    }
                    Ok(StoreEvent::Cleared) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Output fell behind, entries skipped");
                    }
                    Err(RecvError::Closed) => break,
                },
                state = states.recv() => {
                    if let Ok(state) = state {
                        tracing::debug!(%state, "Connection state");
                    }
                }
            }
        }

        session.stop(Some("user interrupt")).await;

        if let Some(path) = &self.export {
            let count = session.export_to_file(path)?;
            println!("Exported {} entries to {}", count, path.display());
        }

        Ok(())
    }
}
