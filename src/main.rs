//! sitewatch — Binary Entrypoint
//! A run-to-completion process meant to be invoked by an external scheduler
//! (cron or similar): checks every configured section once, files tasks for
//! unseen content, persists state, exits.

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sitewatch::config::Config;
use sitewatch::fetch::HttpFetcher;
use sitewatch::orchestrator::Orchestrator;
use sitewatch::sink::todoist::TodoistSink;
use sitewatch::state::StateStore;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = Config::load_default().context("loading configuration")?;
    // Missing credential is the one fatal startup condition.
    let sink = TodoistSink::from_env().context("configuring task sink")?;
    let fetcher = HttpFetcher::from_config(&config.fetch);
    let store = StateStore::new(&config.run.state_path);

    let mut state = store.load().await;
    let orchestrator = Orchestrator::new(&config, &fetcher, &sink, &store);
    let summary = orchestrator.run(&mut state).await?;

    tracing::info!(
        sections_checked = summary.sections_checked,
        sections_skipped = summary.sections_skipped,
        tasks_created = summary.tasks_created,
        dispatch_failures = summary.dispatch_failures,
        "run finished"
    );
    Ok(())
}
