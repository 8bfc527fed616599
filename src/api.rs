//! HTTP boundary
//!
//! Thin adapter over the query service: validates query parameters,
//! invokes the read operations, and translates the error taxonomy into
//! response codes. No core logic lives here.

use crate::{
    error::QueryError,
    metrics::{IngestMetrics, MetricsCollector},
    query::QueryService,
    types::Asset,
};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    /// Read operations over stored observations
    pub queries: Arc<QueryService>,
    /// Ingestion metrics, for the health endpoint
    pub metrics: Arc<MetricsCollector>,
}

/// Create the router with all endpoints
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/stats", get(get_stats))
        .route("/deviation", get(get_deviation))
        .route("/health", get(get_health))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct CoinQuery {
    coin: Option<String>,
}

#[derive(Debug, Serialize)]
struct StatsResponse {
    price: f64,
    #[serde(rename = "marketCap")]
    market_cap: f64,
    #[serde(rename = "24hChange")]
    change_24h: f64,
}

#[derive(Debug, Serialize)]
struct DeviationResponse {
    deviation: f64,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    ingest: IngestMetrics,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Caller-visible failure classes
#[derive(Debug)]
enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".to_string(),
            ),
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            // Storage and invariant failures stay server-side; the caller
            // only sees a generic message.
            QueryError::Store(e) => {
                tracing::error!(error = %e, "Store failure during query");
                ApiError::Internal
            }
            QueryError::Internal(e) => {
                tracing::error!(error = %e, "Internal failure during query");
                ApiError::Internal
            }
        }
    }
}

/// Validates the `coin` parameter before any storage access.
fn parse_coin(params: &CoinQuery) -> Result<Asset, ApiError> {
    let raw = params
        .coin
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("missing required query parameter: coin".to_string()))?;
    raw.parse::<Asset>()
        .map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// GET /stats?coin=<id> - latest stored snapshot for the asset
async fn get_stats(
    Query(params): Query<CoinQuery>,
    State(state): State<AppState>,
) -> Result<Json<StatsResponse>, ApiError> {
    let asset = parse_coin(&params)?;
    let snapshot = state.queries.snapshot(asset).await?;

    Ok(Json(StatsResponse {
        price: snapshot.price_usd,
        market_cap: snapshot.market_cap_usd,
        change_24h: snapshot.change_24h_percent,
    }))
}

/// GET /deviation?coin=<id> - standard deviation over recent price history
async fn get_deviation(
    Query(params): Query<CoinQuery>,
    State(state): State<AppState>,
) -> Result<Json<DeviationResponse>, ApiError> {
    let asset = parse_coin(&params)?;
    let deviation = state.queries.deviation(asset).await?;

    Ok(Json(DeviationResponse { deviation }))
}

/// GET /health - ingestion metrics
async fn get_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        ingest: state.metrics.snapshot().await,
    })
}
