//! Constants for the crypto stats service
//!
//! Fixed tunables live here; deployment-specific values (database URL,
//! listening port) come from the environment via the `config` module.

use crate::types::Asset;

/// How often the ingestion scheduler runs (in seconds)
pub const POLL_INTERVAL_SECS: u64 = 7200;

/// How many recent price samples feed the deviation computation
pub const DEVIATION_SAMPLE_LIMIT: u32 = 100;

/// HTTP request timeout when fetching quotes (in seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Maximum number of pooled database connections
pub const MAX_DB_CONNECTIONS: u32 = 5;

/// Assets tracked by the scheduler
pub const TRACKED_ASSETS: &[Asset] = &[Asset::BTC, Asset::ETH, Asset::MATIC];

/// CoinGecko API base URL
pub const COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";

/// CoinGecko API endpoint for simple price queries
pub const COINGECKO_SIMPLE_PRICE_ENDPOINT: &str = "/simple/price";

/// User agent for HTTP requests
pub const USER_AGENT: &str = "crypto-stats/0.1.0";
