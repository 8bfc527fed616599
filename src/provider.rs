//! Provider abstraction for fetching market quotes from external APIs

use crate::{error::ProviderError, types::{Asset, Quote}};
use async_trait::async_trait;

/// Trait for market quote providers
///
/// Implementations fetch the current price, market cap and 24h change for
/// one asset per call. Retry policy belongs to the caller; implementations
/// perform exactly one request.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Fetches the current quote for a single asset
    ///
    /// # Arguments
    /// * `asset` - The asset to fetch the quote for
    ///
    /// # Returns
    /// A fully populated quote, or an error if the request fails or the
    /// response is missing any of the required numeric fields.
    async fn fetch_quote(&self, asset: Asset) -> Result<Quote, ProviderError>;

    /// Returns the name of this provider
    fn provider_name(&self) -> &'static str;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    /// Mock provider for testing
    pub struct MockProvider {
        quotes: Mutex<HashMap<Asset, Quote>>,
        failing: Mutex<HashSet<Asset>>,
        call_count: Mutex<usize>,
    }

    impl Default for MockProvider {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MockProvider {
        pub fn new() -> Self {
            Self {
                quotes: Mutex::new(HashMap::new()),
                failing: Mutex::new(HashSet::new()),
                call_count: Mutex::new(0),
            }
        }

        pub fn set_quote(&self, asset: Asset, price_usd: f64) {
            let quote = Quote::new(asset, price_usd, price_usd * 1_000_000.0, 1.5);
            self.quotes.lock().unwrap().insert(asset, quote);
        }

        pub fn set_failing(&self, asset: Asset) {
            self.failing.lock().unwrap().insert(asset);
        }

        pub fn call_count(&self) -> usize {
            *self.call_count.lock().unwrap()
        }
    }

    #[async_trait]
    impl QuoteProvider for MockProvider {
        async fn fetch_quote(&self, asset: Asset) -> Result<Quote, ProviderError> {
            *self.call_count.lock().unwrap() += 1;

            if self.failing.lock().unwrap().contains(&asset) {
                return Err(ProviderError::Api(format!(
                    "simulated failure for {}",
                    asset.symbol()
                )));
            }

            self.quotes
                .lock()
                .unwrap()
                .get(&asset)
                .cloned()
                .ok_or_else(|| {
                    ProviderError::Api(format!("no quote configured for {}", asset.symbol()))
                })
        }

        fn provider_name(&self) -> &'static str {
            "mock"
        }
    }
}
