//! Types for the crypto stats service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Supported cryptocurrency assets
///
/// The tracked set is closed and fixed at compile time; query parameters
/// that do not parse into one of these variants are rejected at the API
/// boundary before any storage access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Asset {
    /// Bitcoin
    BTC,
    /// Ethereum
    ETH,
    /// Polygon
    MATIC,
}

impl Asset {
    /// Get the asset symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Asset::BTC => "BTC",
            Asset::ETH => "ETH",
            Asset::MATIC => "MATIC",
        }
    }

    /// Get the CoinGecko ID for this asset
    pub fn coingecko_id(&self) -> &'static str {
        match self {
            Asset::BTC => "bitcoin",
            Asset::ETH => "ethereum",
            Asset::MATIC => "matic-network",
        }
    }

    /// Get all tracked assets in stable iteration order
    pub fn all() -> &'static [Asset] {
        &[Asset::BTC, Asset::ETH, Asset::MATIC]
    }
}

impl FromStr for Asset {
    type Err = UnknownAsset;

    /// Accepts the CoinGecko ID or the ticker symbol, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bitcoin" | "btc" => Ok(Asset::BTC),
            "ethereum" | "eth" => Ok(Asset::ETH),
            "matic-network" | "matic" => Ok(Asset::MATIC),
            _ => Err(UnknownAsset(s.to_string())),
        }
    }
}

impl std::fmt::Display for Asset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.coingecko_id())
    }
}

/// Parse error for values outside the tracked asset set
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown asset: {0}")]
pub struct UnknownAsset(pub String);

/// One market data sample returned by a quote provider
///
/// Carries no timestamp; ingestion time is assigned by the store at the
/// moment of a successful append.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// The asset
    pub asset: Asset,

    /// Price in USD
    pub price_usd: f64,

    /// Market capitalization in USD
    pub market_cap_usd: f64,

    /// 24h price change percentage
    pub change_24h_percent: f64,
}

impl Quote {
    /// Create a new quote
    pub fn new(asset: Asset, price_usd: f64, market_cap_usd: f64, change_24h_percent: f64) -> Self {
        Self {
            asset,
            price_usd,
            market_cap_usd,
            change_24h_percent,
        }
    }
}

/// One persisted observation for an asset
///
/// Immutable once written; the store is an append-only log keyed by
/// `(asset, observed_at)` with `id` reflecting insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    /// Row identifier, monotonically increasing with insertion order
    pub id: i64,

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
