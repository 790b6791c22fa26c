//! bmcheck entry point.
//!
//! Loads configuration, runs one batch over the repository and writes the
//! Markdown report. Logging goes to stderr as JSON lines.

use anyhow::{Context, Result};
use bmcheck_cli::{Harness, write_report};
use bmcheck_client::{BioModelsClient, Endpoints, FetchClient, FetchConfig};
use bmcheck_core::{AppConfig, ResponseCache};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(
        api_url = %config.api_url,
        cache_mode = %config.cache_mode,
        engines = config.engines.len(),
        "starting bmcheck"
    );

    let cache = ResponseCache::configure(config.cache_mode, &config.cache_dir)?;
    let fetch = FetchClient::new(FetchConfig::from_app(&config))?;
    let endpoints = Endpoints::new(&config.api_url, &config.response_format).context("invalid api_url")?;
    let repo = BioModelsClient::new(fetch, cache, endpoints);

    let mut classifier = config.classifier()?;
    let harness = Harness::from_config(&config, Box::new(repo));
    let table = harness.run(&mut classifier).await?;

    write_report(&config.report_path, &table).await?;

    Ok(())
}
