//! Scheduled market data ingestion
//!
//! One background task fetches a quote for every tracked asset and appends
//! it to the store: once immediately at startup, then on a fixed interval.

use crate::{
    constants::TRACKED_ASSETS, metrics::MetricsCollector, provider::QuoteProvider,
    store::ObservationStore,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;

/// Recurring ingestion task
///
/// Fire-and-forget: a run's outcome is logged and counted in metrics but
/// never surfaced to other components. Failures for one asset never abort
/// the rest of the batch, and there are no retries within a run; the next
/// scheduled run re-fetches everything.
pub struct IngestionScheduler {
    provider: Arc<dyn QuoteProvider>,
    store: Arc<ObservationStore>,
    metrics: Arc<MetricsCollector>,
    interval: Duration,
}

impl IngestionScheduler {
    /// Creates a new scheduler
    pub fn new(
        provider: Arc<dyn QuoteProvider>,
        store: Arc<ObservationStore>,
        metrics: Arc<MetricsCollector>,
        interval: Duration,
    ) -> Self {
        Self {
            provider,
            store,
            metrics,
            interval,
        }
    }

    /// Starts the background ingestion task
    ///
    /// The first tick fires immediately (the startup run). At most one run
    /// is ever in flight: the loop awaits each run before the next tick,
    /// and a tick that arrives while a run is still executing is skipped,
    /// not queued.
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            tracing::info!(
                interval_secs = self.interval.as_secs(),
                provider = self.provider.provider_name(),
                assets = TRACKED_ASSETS.len(),
                "Starting ingestion scheduler"
            );

            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                let stored = self.run_once().await;
                tracing::debug!(stored, "Ingestion run finished");
            }
        })
    }

    /// Executes one ingestion run over all tracked assets, in declaration
    /// order. Returns the number of observations stored.
    pub async fn run_once(&self) -> usize {
        let mut stored = 0;

        for &asset in TRACKED_ASSETS {
            let start = Instant::now();
            match self.provider.fetch_quote(asset).await {
                Ok(quote) => {
                    self.metrics.record_fetch(start.elapsed(), true).await;
                    match self.store.append(&quote).await {
                        Ok(observation) => {
                            stored += 1;
                            tracing::debug!(
                                asset = asset.symbol(),
                                price_usd = observation.price_usd,
                                "Stored observation"
                            );
                        }
                        Err(e) => {
                            tracing::warn!(
                                asset = asset.symbol(),
                                error = %e,
                                "Failed to store observation"
                            );
                        }
                    }
                }
                Err(e) => {
                    self.metrics.record_fetch(start.elapsed(), false).await;
                    tracing::warn!(asset = asset.symbol(), error = %e, "Failed to fetch quote");
                }
            }
        }

        self.metrics.record_run_completed().await;
        stored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::mock::MockProvider;
    use crate::types::Asset;
    use tempfile::TempDir;

    async fn test_store() -> (Arc<ObservationStore>, TempDir) {
        let dir = TempDir::new().unwrap();
        let url = format!("sqlite://{}/observations.db", dir.path().display());
        let store = ObservationStore::connect(&url).await.unwrap();
        (Arc::new(store), dir)
    }

    fn scheduler(
        provider: Arc<MockProvider>,
        store: Arc<ObservationStore>,
        metrics: Arc<MetricsCollector>,
    ) -> IngestionScheduler {
        IngestionScheduler::new(provider, store, metrics, Duration::from_secs(7200))
    }

    #[tokio::test]
    async fn run_stores_one_observation_per_asset() {
        let (store, _dir) = test_store().await;
        let provider = Arc::new(MockProvider::new());
        provider.set_quote(Asset::BTC, 40_000.0);
        provider.set_quote(Asset::ETH, 2_500.0);
        provider.set_quote(Asset::MATIC, 0.85);
        let metrics = Arc::new(MetricsCollector::new("mock"));

        let stored = scheduler(provider.clone(), store.clone(), metrics)
            .run_once()
            .await;

        assert_eq!(stored, 3);
        assert_eq!(provider.call_count(), 3);
        for &asset in TRACKED_ASSETS {
            assert!(store.latest(asset).await.unwrap().is_some());
        }
    }

    #[tokio::test]
    async fn one_failing_asset_does_not_abort_the_batch() {
        let (store, _dir) = test_store().await;
        let provider = Arc::new(MockProvider::new());
        provider.set_quote(Asset::BTC, 40_000.0);
        provider.set_failing(Asset::ETH);
        provider.set_quote(Asset::MATIC, 0.85);
        let metrics = Arc::new(MetricsCollector::new("mock"));

        let stored = scheduler(provider.clone(), store.clone(), metrics.clone())
            .run_once()
            .await;

        assert_eq!(stored, 2);
        assert_eq!(provider.call_count(), 3);
        assert!(store.latest(Asset::BTC).await.unwrap().is_some());
        assert!(store.latest(Asset::ETH).await.unwrap().is_none());
        assert!(store.latest(Asset::MATIC).await.unwrap().is_some());

        let snapshot = metrics.snapshot().await;
        assert_eq!(snapshot.total_fetches, 3);
        assert_eq!(snapshot.failed_fetches, 1);
        assert!(snapshot.last_run_at.is_some());
    }

    #[tokio::test]
    async fn repeated_runs_append_rather_than_overwrite() {
        let (store, _dir) = test_store().await;
        let provider = Arc::new(MockProvider::new());
        provider.set_quote(Asset::BTC, 40_000.0);
        provider.set_quote(Asset::ETH, 2_500.0);
        provider.set_quote(Asset::MATIC, 0.85);
        let metrics = Arc::new(MetricsCollector::new("mock"));
        let scheduler = scheduler(provider, store.clone(), metrics);

        scheduler.run_once().await;
        scheduler.run_once().await;

        let history = store.recent(Asset::BTC, 100).await.unwrap();
        assert_eq!(history.len(), 2);
    }
}
