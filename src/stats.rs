//! Rolling statistics over price history
//!
//! Pure computations; rounding for presentation happens at the query
//! boundary, not here.

use crate::error::StatsError;

/// Computes the population standard deviation of a sequence of samples.
///
/// Uses the population form (divisor = N, not N-1): the stored window is
/// treated as the whole population, not a sample drawn from one.
///
/// # Errors
///
/// Returns `StatsError::InsufficientData` for an empty input.
pub fn population_std_dev(samples: &[f64]) -> Result<f64, StatsError> {
    if samples.is_empty() {
        return Err(StatsError::InsufficientData);
    }

    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    let variance = samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;

    Ok(variance.sqrt())
}
