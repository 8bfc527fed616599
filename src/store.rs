//! Append-only observation store backed by SQLite
//!
//! The store exclusively owns the durable record set. Observations are
//! never updated or deleted; the only read pattern is
//! `(asset, observed_at desc)`, which is covered by a single index.

use crate::{
    constants::MAX_DB_CONNECTIONS,
    error::StoreError,
    types::{Asset, Observation, Quote},
};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;

const CREATE_TABLE_SQL: &str = r"
    CREATE TABLE IF NOT EXISTS observations (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        asset TEXT NOT NULL,
        price_usd REAL NOT NULL,
        market_cap_usd REAL NOT NULL,
        change_24h_percent REAL NOT NULL,
        observed_at INTEGER NOT NULL
    )
";

const CREATE_INDEX_SQL: &str = r"
    CREATE INDEX IF NOT EXISTS idx_observations_asset_observed_at
    ON observations (asset, observed_at DESC)
";

/// Durable store for timestamped market observations
pub struct ObservationStore {
    pool: SqlitePool,
}

impl ObservationStore {
    /// Opens the database and prepares the schema.
    ///
    /// WAL mode keeps concurrent appends and reads from blocking each
    /// other. The database file is created if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Connection` if the database cannot be opened
    /// or the schema cannot be created.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| StoreError::Connection(e.to_string()))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_DB_CONNECTIONS)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        sqlx::query(CREATE_TABLE_SQL)
            .execute(&pool)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        sqlx::query(CREATE_INDEX_SQL)
            .execute(&pool)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        tracing::info!(max_connections = MAX_DB_CONNECTIONS, "Observation store ready");

        Ok(Self { pool })
    }

    /// Persists one quote, assigning the ingestion time at the moment of
    /// the write.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Query` on durable-storage failure. The insert
    /// is a single statement; a record is either fully written or not at
    /// all.
    pub async fn append(&self, quote: &Quote) -> Result<Observation, StoreError> {
        self.append_at(quote, Utc::now()).await
    }

    /// Persists one quote with an explicit observation timestamp.
    pub async fn append_at(
        &self,
        quote: &Quote,
        observed_at: DateTime<Utc>,
    ) -> Result<Observation, StoreError> {
        let result = sqlx::query(
            r"
            INSERT INTO observations (asset, price_usd, market_cap_usd, change_24h_percent, observed_at)
            VALUES (?, ?, ?, ?, ?)
            ",
        )
        .bind(quote.asset.coingecko_id())
        .bind(quote.price_usd)
        .bind(quote.market_cap_usd)
        .bind(quote.change_24h_percent)
        .bind(observed_at.timestamp_millis())
        .execute(&self.pool)
        .await?;

        tracing::debug!(
            asset = quote.asset.symbol(),
            price_usd = quote.price_usd,
            "Observation appended"
        );

        Ok(Observation {
            id: result.last_insert_rowid(),
            asset: quote.asset,
            price_usd: quote.price_usd,
            market_cap_usd: quote.market_cap_usd,
            change_24h_percent: quote.change_24h_percent,
            observed_at,
        })
    }

    /// Returns the single most recent observation for an asset.
    ///
    /// Ties on `observed_at` are broken by insertion order, most recent
    /// insertion first. `None` when no records exist for the asset.
    pub async fn latest(&self, asset: Asset) -> Result<Option<Observation>, StoreError> {
        let row = sqlx::query(
            r"
            SELECT id, asset, price_usd, market_cap_usd, change_24h_percent, observed_at
            FROM observations
            WHERE asset = ?
            ORDER BY observed_at DESC, id DESC
            LIMIT 1
            ",
        )
        .bind(asset.coingecko_id())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| row_to_observation(&r)).transpose()
    }

    /// Returns up to `limit` most recent observations for an asset,
    /// ordered by `observed_at` descending.
    ///
    /// An empty vec (not an error) when no records exist.
    pub async fn recent(&self, asset: Asset, limit: u32) -> Result<Vec<Observation>, StoreError> {
        let rows = sqlx::query(
            r"
            SELECT id, asset, price_usd, market_cap_usd, change_24h_percent, observed_at
            FROM observations
            WHERE asset = ?
            ORDER BY observed_at DESC, id DESC
            LIMIT ?
            ",
        )
        .bind(asset.coingecko_id())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_observation).collect()
    }
}

/// Convert a database row into an `Observation`.
fn row_to_observation(row: &SqliteRow) -> Result<Observation, StoreError> {
    let asset_id: String = row
        .try_get("asset")
        .map_err(|e| StoreError::Query(format!("asset: {e}")))?;
    let asset = asset_id
        .parse::<Asset>()
        .map_err(|e| StoreError::Query(format!("unexpected asset in store: {e}")))?;

    let millis: i64 = row
        .try_get("observed_at")
        .map_err(|e| StoreError::Query(format!("observed_at: {e}")))?;
    let observed_at = DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| StoreError::Query(format!("invalid timestamp in store: {millis}")))?;

    Ok(Observation {
        id: row
            .try_get("id")
            .map_err(|e| StoreError::Query(format!("id: {e}")))?,
        asset,
        price_usd: row
            .try_get("price_usd")
            .map_err(|e| StoreError::Query(format!("price_usd: {e}")))?,
        market_cap_usd: row
            .try_get("market_cap_usd")
            .map_err(|e| StoreError::Query(format!("market_cap_usd: {e}")))?,
        change_24h_percent: row
            .try_get("change_24h_percent")
            .map_err(|e| StoreError::Query(format!("change_24h_percent: {e}")))?,
        observed_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    async fn test_store() -> (ObservationStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let url = format!("sqlite://{}/observations.db", dir.path().display());
        let store = ObservationStore::connect(&url).await.unwrap();
        (store, dir)
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn quote(asset: Asset, price: f64) -> Quote {
        Quote::new(asset, price, price * 1_000_000.0, 0.5)
    }

    #[tokio::test]
    async fn latest_returns_most_recently_observed() {
        let (store, _dir) = test_store().await;

        store.append_at(&quote(Asset::BTC, 10.0), at(0)).await.unwrap();
        store.append_at(&quote(Asset::BTC, 20.0), at(60)).await.unwrap();
        store.append_at(&quote(Asset::BTC, 15.0), at(30)).await.unwrap();

        let latest = store.latest(Asset::BTC).await.unwrap().unwrap();
        assert_eq!(latest.price_usd, 20.0);
        assert_eq!(latest.observed_at, at(60));
    }

    #[tokio::test]
    async fn latest_breaks_timestamp_ties_by_insertion_order() {
        let (store, _dir) = test_store().await;

        store.append_at(&quote(Asset::ETH, 1.0), at(0)).await.unwrap();
        store.append_at(&quote(Asset::ETH, 2.0), at(0)).await.unwrap();

        let latest = store.latest(Asset::ETH).await.unwrap().unwrap();
        assert_eq!(latest.price_usd, 2.0);
    }

    #[tokio::test]
    async fn latest_is_none_for_empty_asset() {
        let (store, _dir) = test_store().await;
        assert!(store.latest(Asset::MATIC).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn recent_respects_limit_and_descending_order() {
        let (store, _dir) = test_store().await;

        for i in 0..5 {
            store
                .append_at(&quote(Asset::BTC, 100.0 + i as f64), at(i * 60))
                .await
                .unwrap();
        }

        let recent = store.recent(Asset::BTC, 3).await.unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].price_usd, 104.0);
        assert_eq!(recent[1].price_usd, 103.0);
        assert_eq!(recent[2].price_usd, 102.0);
        assert!(recent[0].observed_at > recent[1].observed_at);
    }

    #[tokio::test]
    async fn recent_is_empty_not_an_error_for_missing_asset() {
        let (store, _dir) = test_store().await;
        let recent = store.recent(Asset::ETH, 100).await.unwrap();
        assert!(recent.is_empty());
    }

    #[tokio::test]
    async fn assets_are_isolated() {
        let (store, _dir) = test_store().await;

        store.append_at(&quote(Asset::BTC, 40_000.0), at(0)).await.unwrap();
        store.append_at(&quote(Asset::ETH, 2_500.0), at(0)).await.unwrap();

        let btc = store.recent(Asset::BTC, 10).await.unwrap();
        assert_eq!(btc.len(), 1);
        assert_eq!(btc[0].asset, Asset::BTC);
    }

    #[tokio::test]
    async fn append_assigns_ingestion_time_when_not_supplied() {
        let (store, _dir) = test_store().await;

        let before = Utc::now();
        let stored = store.append(&quote(Asset::BTC, 41_000.0)).await.unwrap();
        let after = Utc::now();

        assert!(stored.observed_at >= before - chrono::Duration::seconds(1));
        assert!(stored.observed_at <= after + chrono::Duration::seconds(1));
    }
}
