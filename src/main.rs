//! ynab-snapshot - command line entry point
//!
//! Takes one category snapshot of every budget and logs the rows.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use ynab_snapshot::{
    config::Config, sink::TracingSink, snapshot::run_snapshot, EngineOptions, HttpYnabClient,
    SnapshotEngine,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ynab_snapshot=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Loaded configuration: month={}, rate_limit={:?}, merge_policy={}",
        config.month, config.rate_limit_interval, config.merge_policy
    );

    let client = HttpYnabClient::with_base_url(
        config.api_token.clone(),
        config.base_url.clone(),
        config.request_timeout,
    )?;
    let engine = SnapshotEngine::new(Arc::new(client), EngineOptions::from(&config));

    let mut sink = TracingSink;
    let summary = run_snapshot(&engine, config.month, &mut sink, config.include_empty).await?;
    info!(
        "Snapshot complete: {} budgets ({} failed), {} rows, {} lookups failed",
        summary.budgets, summary.budgets_failed, summary.rows, summary.lookups_failed
    );

    Ok(())
}
