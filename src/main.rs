mod cli;
mod error;
mod models;
mod scrapers;
mod sinks;

use anyhow::Context;
use clap::Parser;
use cli::Args;
use scrapers::{HttpFetcher, Paginator};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Args::parse()
        .into_config()
        .context("Invalid command-line configuration")?;

    info!("🃏 Cardex Scout");
    info!("Starting scrape from {}", config.start_url);

    let selectors = config
        .selectors
        .compile()
        .context("Invalid CSS selector")?;
    let fetcher = HttpFetcher::new(&config.options)?;

    // Fetch errors abort here, before any sink is touched.
    let cards = Paginator::new(
        &fetcher,
        config.start_url.clone(),
        selectors,
        config.options.clone(),
    )
    .collect_all()
    .await
    .context("Scrape aborted")?;

    info!("✅ Scraped {} cards", cards.len());

    sinks::write_csv(&config.output_csv, &cards)
        .with_context(|| format!("Failed to write {}", config.output_csv.display()))?;

    if let Some(target) = &config.sheet {
        sinks::sheets::upload(target, &cards, config.options.timeout)
            .await
            .with_context(|| {
                format!(
                    "Google Sheets export failed (CSV at {} is complete)",
                    config.output_csv.display()
                )
            })?;
    }

    Ok(())
}
