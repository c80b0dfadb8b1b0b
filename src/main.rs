use clap::Parser;
use opslog_stream::cli::{Cli, Commands};
use opslog_stream::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        Config::default()
    });

    // Initialize telemetry
    opslog_stream::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Tail(args) => {
            tracing::info!("Starting log tail");
            args.execute(config).await?;
        }
        Commands::Status(args) => {
            args.execute(config).await?;
        }
        Commands::Trigger(args) => {
            args.execute(config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("  Stream: {}", config.stream.url);
            println!(
                "  Reconnect: every {}ms, connect timeout {}ms",
                config.stream.reconnect_delay_ms, config.stream.connect_timeout_ms
            );
            println!("  Store: {} entries", config.store.capacity);
            println!("  Noisy substrings: {:?}", config.filter.noisy_substrings);
            println!("  Diagnostics: {}", config.diagnostics.base_url);
            match config.diagnostics.poll_interval() {
                Some(interval) => println!("  Status polling: every {}s", interval.as_secs()),
                None => println!("  Status polling: off"),
            }
            println!(
                "  Telemetry: level={}, format={:?}, metrics_port={:?}",
                config.telemetry.log_level,
                config.telemetry.log_format,
                config.telemetry.metrics_port
            );
        }
    }

    Ok(())
}
