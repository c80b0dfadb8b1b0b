//! Trigger command implementation

use crate::config::Config;
use crate::diagnostics::DiagnosticsProbe;
use crate::filter::NoiseFilter;
use crate::ingest::IngestPipeline;
use crate::store::BoundedLogStore;
use clap::Args;

#[derive(Args, Debug)]
pub struct TriggerArgs {
    /// Number of test entries to request
    #[arg(short = 'n', long, default_value = "5")]
    pub count: u32,
}

impl TriggerArgs {
    pub async fn execute(&self, config: Config) -> anyhow::Result<()> {
        let pipeline = IngestPipeline::new(NoiseFilter::default(), BoundedLogStore::new(1));
        let probe = DiagnosticsProbe::new(config.diagnostics.to_probe_config(), pipeline)?;

        probe.request_test_entries(self.count).await?;
        println!("Requested {} test entries from {}", self.count, probe.config().base_url);
        Ok(())
    }
}
