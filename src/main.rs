//! Service entrypoint: config → store → scheduler → HTTP server.

use anyhow::Context;
use crypto_stats::api::{self, AppState};
use crypto_stats::config::Settings;
use crypto_stats::metrics::MetricsCollector;
use crypto_stats::provider::QuoteProvider;
use crypto_stats::providers::CoinGeckoProvider;
use crypto_stats::query::QueryService;
use crypto_stats::scheduler::IngestionScheduler;
use crypto_stats::store::ObservationStore;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::from_env().context("failed to load configuration")?;

    // A store that cannot be reached at startup is the one fatal error;
    // everything after this point is contained and logged.
    let store = Arc::new(
        ObservationStore::connect(&settings.database_url)
            .await
            .context("failed to open the observation store")?,
    );

    let provider: Arc<dyn QuoteProvider> =
        Arc::new(CoinGeckoProvider::new().context("failed to build the quote provider")?);
    let metrics = Arc::new(MetricsCollector::new(provider.provider_name()));

    IngestionScheduler::new(
        provider,
        store.clone(),
        metrics.clone(),
        settings.poll_interval,
    )
    .spawn();

    let state = AppState {
        queries: Arc::new(QueryService::new(store)),
        metrics,
    };

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", settings.port))
        .await
        .with_context(|| format!("failed to bind port {}", settings.port))?;

    tracing::info!(port = settings.port, "Listening for requests");
    axum::serve(listener, api::router(state)).await?;

    Ok(())
}
