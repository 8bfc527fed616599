//! Read-path query operations
//!
//! Composes the observation store with the statistics engine. Pure reads;
//! every call is a fresh query against the store.

use crate::{
    constants::DEVIATION_SAMPLE_LIMIT,
    error::QueryError,
    stats,
    store::ObservationStore,
    types::Asset,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Latest market snapshot for one asset
#[derive(Debug, Clone, serde::Serialize)]
pub struct PriceSnapshot {
    /// The asset
    pub asset: Asset,
    /// Price in USD
    pub price_usd: f64,
    /// Market capitalization in USD
    pub market_cap_usd: f64,
    /// 24h price change percentage
    pub change_24h_percent: f64,
    /// When the sample was recorded
    pub observed_at: DateTime<Utc>,
}

/// Read operations over stored observations
pub struct QueryService {
    store: Arc<ObservationStore>,
}

impl QueryService {
    /// Creates a new query service
    pub fn new(store: Arc<ObservationStore>) -> Self {
        Self { store }
    }

    /// Returns the most recent snapshot for an asset.
    ///
    /// # Errors
    ///
    /// `QueryError::NotFound` when no observations exist for the asset.
    pub async fn snapshot(&self, asset: Asset) -> Result<PriceSnapshot, QueryError> {
        let observation = self
            .store
            .latest(asset)
            .await?
            .ok_or_else(|| QueryError::not_found(asset.coingecko_id()))?;

        Ok(PriceSnapshot {
            asset: observation.asset,
            price_usd: observation.price_usd,
            market_cap_usd: observation.market_cap_usd,
            change_24h_percent: observation.change_24h_percent,
            observed_at: observation.observed_at,
        })
    }

    /// Returns the population standard deviation of the most recent price
    /// samples (up to 100), rounded to 2 decimal places.
    ///
    /// Rounding happens here, at the presentation boundary; the statistics
    /// engine itself keeps full precision.
    ///
    /// # Errors
    ///
    /// `QueryError::NotFound` when no observations exist for the asset.
    pub async fn deviation(&self, asset: Asset) -> Result<f64, QueryError> {
        let recent = self.store.recent(asset, DEVIATION_SAMPLE_LIMIT).await?;
        if recent.is_empty() {
            return Err(QueryError::not_found(asset.coingecko_id()));
        }

        let prices: Vec<f64> = recent.iter().map(|o| o.price_usd).collect();

        // Non-empty past the guard above, so InsufficientData cannot occur.
        let sigma = stats::population_std_dev(&prices)
            .map_err(|e| QueryError::Internal(e.to_string()))?;

        Ok(round2(sigma))
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Quote;
    use chrono::TimeZone;
    use tempfile::TempDir;

    async fn test_service() -> (QueryService, Arc<ObservationStore>, TempDir) {
        let dir = TempDir::new().unwrap();
        let url = format!("sqlite://{}/observations.db", dir.path().display());
        let store = Arc::new(ObservationStore::connect(&url).await.unwrap());
        (QueryService::new(store.clone()), store, dir)
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[tokio::test]
    async fn snapshot_of_empty_asset_is_not_found() {
        let (service, _store, _dir) = test_service().await;
        let err = service.snapshot(Asset::BTC).await.unwrap_err();
        assert!(matches!(err, QueryError::NotFound { .. }));
    }

    #[tokio::test]
    async fn deviation_of_empty_asset_is_not_found() {
        let (service, _store, _dir) = test_service().await;
        let err = service.deviation(Asset::ETH).await.unwrap_err();
        assert!(matches!(err, QueryError::NotFound { .. }));
    }

    #[tokio::test]
    async fn snapshot_reflects_the_latest_observation() {
        let (service, store, _dir) = test_service().await;

        store
            .append_at(&Quote::new(Asset::BTC, 40_000.0, 8.0e11, -1.0), at(0))
            .await
            .unwrap();
        store
            .append_at(&Quote::new(Asset::BTC, 41_000.0, 8.1e11, 2.5), at(60))
            .await
            .unwrap();

        let snapshot = service.snapshot(Asset::BTC).await.unwrap();
        assert_eq!(snapshot.price_usd, 41_000.0);
        assert_eq!(snapshot.market_cap_usd, 8.1e11);
        assert_eq!(snapshot.change_24h_percent, 2.5);
    }

    #[tokio::test]
    async fn deviation_of_a_single_sample_is_zero() {
        let (service, store, _dir) = test_service().await;

        store
            .append_at(&Quote::new(Asset::MATIC, 0.85, 8.0e9, 0.0), at(0))
            .await
            .unwrap();

        assert_eq!(service.deviation(Asset::MATIC).await.unwrap(), 0.0);
    }

    #[tokio::test]
    async fn deviation_over_ten_ascending_prices() {
        let (service, store, _dir) = test_service().await;

        for i in 1..=10 {
            let price = (i * 10) as f64;
            store
                .append_at(&Quote::new(Asset::BTC, price, price * 1e6, 0.0), at(i * 60))
                .await
                .unwrap();
        }

        // Population sigma of [10, 20, ..., 100] is sqrt(825) = 28.7228...,
        // rounded at this boundary to two decimals.
        assert_eq!(service.deviation(Asset::BTC).await.unwrap(), 28.72);
    }
}
