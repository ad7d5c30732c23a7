//! Correlation-aware statistics for sampled observables.

use mdint_core::errors::ErrorInfo;
use mdint_core::IntegratorError;
use serde::{Deserialize, Serialize};

/// Statistical inefficiency `g = 1 + 2 tau` of a timeseries.
///
/// Sums the normalized autocorrelation function until it first drops to zero
/// or below after lag `mintime`. With `fast` the lag increment grows by one on
/// every iteration. The result is clamped to `g >= 1`.
pub fn statistical_inefficiency(
    series: &[f64],
    fast: bool,
    mintime: usize,
) -> Result<f64, IntegratorError> {
    let n = series.len();
    if n < 2 {
        return Err(IntegratorError::Statistics(
            ErrorInfo::new("too-short", "at least two samples are required")
                .with_context("samples", n.to_string()),
        ));
    }

    let mean = series.iter().sum::<f64>() / n as f64;
    let deviations: Vec<f64> = series.iter().map(|value| value - mean).collect();
    let variance = deviations.iter().map(|d| d * d).sum::<f64>() / n as f64;
    if variance == 0.0 {
        return Err(IntegratorError::Statistics(
            ErrorInfo::new("zero-variance", "series is constant")
                .with_context("samples", n.to_string()),
        ));
    }

    let mut g = 1.0;
    let mut t = 1;
    let mut increment = 1;
    while t < n - 1 {
        let overlap = n - t;
        let lagged: f64 = deviations[..overlap]
            .iter()
            .zip(&deviations[t..])
            .map(|(a, b)| a * b)
            .sum();
        let correlation = lagged / (overlap as f64 * variance);
        if correlation <= 0.0 && t > mintime {
            break;
        }
        g += 2.0 * correlation * (1.0 - t as f64 / n as f64) * increment as f64;
        t += increment;
        if fast {
            increment += 1;
        }
    }
    Ok(g.max(1.0))
}

/// Sample mean with its correlation-corrected standard error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeanEstimate {
    /// Sample mean.
    pub mean: f64,
    /// `std / sqrt(N / g)`.
    pub standard_error: f64,
    /// Statistical inefficiency used for the correction.
    pub statistical_inefficiency: f64,
}

/// Mean and standard error of `series`, accounting for autocorrelation.
pub fn mean_with_standard_error(series: &[f64]) -> Result<MeanEstimate, IntegratorError> {
    let g = statistical_inefficiency(series, false, 3)?;
    let n = series.len() as f64;
    let mean = series.iter().sum::<f64>() / n;
    let variance = series.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / n;
    Ok(MeanEstimate {
        mean,
        standard_error: variance.sqrt() / (n / g).sqrt(),
        statistical_inefficiency: g,
    })
}
