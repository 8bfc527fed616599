//! Ingestion health metrics
//!
//! Tracks fetch latency and success rates for the scheduled ingestion
//! runs; surfaced through the health endpoint.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::RwLock;

/// Maximum number of samples to keep for metrics calculation
const MAX_SAMPLES: usize = 100;

/// Snapshot of ingestion metrics
#[derive(Debug, Clone, Serialize)]
pub struct IngestMetrics {
    /// Name of the quote provider
    pub provider_name: String,
    /// 50th percentile fetch latency in milliseconds
    pub latency_p50_ms: f64,
    /// 99th percentile fetch latency in milliseconds
    pub latency_p99_ms: f64,
    /// Success rate (0.0 to 1.0)
    pub success_rate: f64,
    /// Total number of fetches tracked
    pub total_fetches: u64,
    /// Number of failed fetches
    pub failed_fetches: u64,
    /// When the last ingestion run completed
    pub last_run_at: Option<DateTime<Utc>>,
}

impl IngestMetrics {
    /// Creates metrics with no data
    pub fn empty(provider_name: &str) -> Self {
        Self {
            provider_name: provider_name.to_string(),
            latency_p50_ms: 0.0,
            latency_p99_ms: 0.0,
            success_rate: 1.0,
            total_fetches: 0,
            failed_fetches: 0,
            last_run_at: None,
        }
    }
}

/// Internal sample for latency tracking
#[derive(Debug, Clone)]
struct FetchSample {
    duration_ms: f64,
    success: bool,
}

#[derive(Debug, Default)]
struct Counters {
    total: u64,
    failed: u64,
    last_run_at: Option<DateTime<Utc>>,
}

/// Collects fetch metrics from the ingestion scheduler
pub struct MetricsCollector {
    provider_name: String,
    samples: RwLock<VecDeque<FetchSample>>,
    counters: RwLock<Counters>,
}

impl MetricsCollector {
    /// Creates a new metrics collector for a provider
    pub fn new(provider_name: &str) -> Self {
        Self {
            provider_name: provider_name.to_string(),
            samples: RwLock::new(VecDeque::with_capacity(MAX_SAMPLES)),
            counters: RwLock::new(Counters::default()),
        }
    }

    /// Records one fetch with its duration and success status
    pub async fn record_fetch(&self, duration: Duration, success: bool) {
        let duration_ms = duration.as_secs_f64() * 1000.0;

        {
            let mut counters = self.counters.write().await;
            counters.total += 1;
            if !success {
                counters.failed += 1;
            }
        }

        let mut samples = self.samples.write().await;
        if samples.len() >= MAX_SAMPLES {
            samples.pop_front();
        }
        samples.push_back(FetchSample {
            duration_ms,
            success,
        });
    }

    /// Marks an ingestion run as completed
    pub async fn record_run_completed(&self) {
        self.counters.write().await.last_run_at = Some(Utc::now());
    }

    /// Computes current metrics from collected samples
    pub async fn snapshot(&self) -> IngestMetrics {
        let samples = self.samples.read().await;
        let counters = self.counters.read().await;

        if samples.is_empty() {
            let mut metrics = IngestMetrics::empty(&self.provider_name);
            metrics.last_run_at = counters.last_run_at;
            return metrics;
        }

        let mut latencies: Vec<f64> = samples
            .iter()
            .filter(|s| s.success)
            .map(|s| s.duration_ms)
            .collect();

        latencies.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let success_rate = if counters.total > 0 {
            (counters.total - counters.failed) as f64 / counters.total as f64
        } else {
            1.0
        };

        IngestMetrics {
            provider_name: self.provider_name.clone(),
            latency_p50_ms: percentile(&latencies, 50.0),
            latency_p99_ms: percentile(&latencies, 99.0),
            success_rate,
            total_fetches: counters.total,
            failed_fetches: counters.failed,
            last_run_at: counters.last_run_at,
        }
    }
}

/// Calculate percentile from sorted values
fn percentile(sorted_values: &[f64], p: f64) -> f64 {
    if sorted_values.is_empty() {
        return 0.0;
    }

    let idx = (p / 100.0 * (sorted_values.len() - 1) as f64).round() as usize;
    sorted_values[idx.min(sorted_values.len() - 1)]
}
