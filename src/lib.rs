//! # Crypto Stats Service
//!
//! Periodically polls CoinGecko for price, market cap and 24h change of a
//! fixed set of crypto assets, persists every observation into an
//! append-only store, and serves two read endpoints: the latest snapshot
//! and the standard deviation of recent price history.
//!
//! ## Architecture
//!
//! ```text
//! IngestionScheduler (startup run + every 2h)
//!     ↓
//! QuoteProvider (CoinGecko)
//!     ↓
//! ObservationStore (SQLite, append-only)
//!     ↑
//! QueryService (snapshot / deviation)
//!     ↑
//! HTTP boundary (GET /stats, GET /deviation, GET /health)
//! ```
//!
//! The write path (scheduler → provider → store) and the read path
//! (HTTP → query service → store) run concurrently and coordinate only
//! through the store. Ingestion failures are logged and contained; they
//! never reach a caller or crash the process.

pub mod api;
pub mod config;
pub mod constants;
pub mod error;
pub mod metrics;
pub mod provider;
pub mod providers;
pub mod query;
pub mod scheduler;
pub mod stats;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use error::{ProviderError, QueryError, StatsError, StoreError};
pub use metrics::{IngestMetrics, MetricsCollector};
pub use provider::QuoteProvider;
pub use providers::CoinGeckoProvider;
pub use query::{PriceSnapshot, QueryService};
pub use scheduler::IngestionScheduler;
pub use store::ObservationStore;
pub use types::{Asset, Observation, Quote};
