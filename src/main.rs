mod cli;
mod config;
mod error;
mod migrate;
mod model;
mod providers;
mod util;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use migrate::journal::Journal;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let args = cli::parse_args(&args)?;
    if args.help {
        cli::print_help();
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load config
    let config_path = args.config.unwrap_or_else(config::default_config_path);
    let mut config = config::load_config(&config_path)?;
    if let Some(delay_ms) = args.delay_ms {
        config.migration.request_delay_ms = delay_ms;
    }

    let journal = if args.no_journal {
        Journal::disabled()
    } else {
        Journal::new(config.migration.journal_path())
    };

    let (source, destination) = providers::create_providers(&config)?;

    let summary = migrate::run(
        &source,
        &destination,
        config.azure_devops.root_suite_id,
        &journal,
    )
    .await
    .context("Migration aborted while reading from TestRail")?;

    println!("\n{summary}");
    Ok(())
}
