//! Status command implementation

use crate::config::Config;
use crate::diagnostics::DiagnosticsProbe;
use crate::filter::NoiseFilter;
use crate::ingest::IngestPipeline;
use crate::store::BoundedLogStore;
use clap::Args;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Print the raw JSON status report
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    pub async fn execute(&self, config: Config) -> anyhow::Result<()> {
        let pipeline = IngestPipeline::new(NoiseFilter::default(), BoundedLogStore::new(1));
        let probe = DiagnosticsProbe::new(config.diagnostics.to_probe_config(), pipeline)?;

        let status = probe.fetch_status().await?;
        if self.json {
            println!("{}", serde_json::to_string_pretty(&status)?);
        } else {
            println!("{}", status.summary());
        }
        Ok(())
    }
}
