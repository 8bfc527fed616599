//! Error types for the crypto stats service

use thiserror::Error;

/// Errors that can occur when fetching quotes from a provider
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network request failed or timed out
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response did not contain the expected fields
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Rate limit exceeded
    #[error("rate limit exceeded")]
    RateLimited,

    /// Provider API error
    #[error("provider API error: {0}")]
    Api(String),
}

/// Errors from the observation store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database connection or schema setup error
    #[error("database connection error: {0}")]
    Connection(String),

    /// Query execution error
    #[error("query error: {0}")]
    Query(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        Self::Query(err.to_string())
    }
}

/// Errors from the statistics engine
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StatsError {
    /// Fewer samples than the computation requires
    #[error("insufficient data: at least one sample is required")]
    InsufficientData,
}

/// Errors from read-path query operations
#[derive(Debug, Error)]
pub enum QueryError {
    /// No observations stored for the asset
    #[error("no data recorded for {asset}")]
    NotFound { asset: String },

    /// Underlying storage failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Invariant violation inside the read path
    #[error("internal error: {0}")]
    Internal(String),
}

impl QueryError {
    /// Creates a NotFound error
    pub fn not_found(asset: &str) -> Self {
        Self::NotFound {
            asset: asset.to_string(),
        }
    }
}
