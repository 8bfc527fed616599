//! CoinGecko quote provider implementation

use crate::{
    constants::{
        COINGECKO_API_URL, COINGECKO_SIMPLE_PRICE_ENDPOINT, REQUEST_TIMEOUT_SECS, USER_AGENT,
    },
    error::ProviderError,
    provider::QuoteProvider,
    types::{Asset, Quote},
};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// CoinGecko API response for simple price queries
#[derive(Debug, Deserialize)]
struct CoinGeckoResponse {
    #[serde(flatten)]
    coins: HashMap<String, CoinGeckoQuote>,
}

/// Per-coin payload; all three fields are required for a valid observation
#[derive(Debug, Deserialize)]
struct CoinGeckoQuote {
    usd: Option<f64>,
    usd_market_cap: Option<f64>,
    usd_24h_change: Option<f64>,
}

/// CoinGecko quote provider
pub struct CoinGeckoProvider {
    client: Client,
    base_url: String,
}

impl CoinGeckoProvider {
    /// Creates a new CoinGecko provider
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_base_url(COINGECKO_API_URL)
    }

    /// Creates a provider against a custom base URL (used by tests)
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(ProviderError::Network)?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Builds the simple-price URL for one asset
    fn build_url(&self, asset: Asset) -> String {
        format!(
            "{}{}?ids={}&vs_currencies=usd&include_market_cap=true&include_24hr_change=true",
            self.base_url,
            COINGECKO_SIMPLE_PRICE_ENDPOINT,
            asset.coingecko_id()
        )
    }

    /// Maps the per-coin payload into a normalized quote
    fn parse_quote(asset: Asset, payload: &CoinGeckoQuote) -> Result<Quote, ProviderError> {
        let price_usd = payload.usd.ok_or_else(|| {
            ProviderError::MalformedResponse(format!("missing usd price for {}", asset))
        })?;
        let market_cap_usd = payload.usd_market_cap.ok_or_else(|| {
            ProviderError::MalformedResponse(format!("missing usd_market_cap for {}", asset))
        })?;
        let change_24h_percent = payload.usd_24h_change.ok_or_else(|| {
            ProviderError::MalformedResponse(format!("missing usd_24h_change for {}", asset))
        })?;

        Ok(Quote::new(asset, price_usd, market_cap_usd, change_24h_percent))
    }
}

#[async_trait]
impl QuoteProvider for CoinGeckoProvider {
    async fn fetch_quote(&self, asset: Asset) -> Result<Quote, ProviderError> {
        let url = self.build_url(asset);
        tracing::debug!(asset = asset.symbol(), %url, "Fetching quote from CoinGecko");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(ProviderError::Network)?;

        if response.status().as_u16() == 429 {
            return Err(ProviderError::RateLimited);
        }

        if !response.status().is_success() {
            return Err(ProviderError::Api(format!(
                "HTTP {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        let body = response.text().await.map_err(ProviderError::Network)?;

        let parsed: CoinGeckoResponse = serde_json::from_str(&body).map_err(|e| {
            ProviderError::MalformedResponse(format!(
                "failed to parse CoinGecko response: {}. Response: {}",
                e, body
            ))
        })?;

        let payload = parsed.coins.get(asset.coingecko_id()).ok_or_else(|| {
            ProviderError::MalformedResponse(format!("no entry for {} in response", asset))
        })?;

        Self::parse_quote(asset, payload)
    }

    fn provider_name(&self) -> &'static str {
        "coingecko"
    }
}
