//! Reduction of a result set to summary statistics.
//!
//! Median and p95 use floor-indexed nearest-rank selection on the ascending
//! elapsed times: median is element `floor(n / 2)`, p95 is element
//! `floor(n * 0.95)`. Neither interpolates, and an even-sized set does not
//! average its two middle elements. Historical run comparisons assume these
//! exact indices, so do not switch to an interpolating estimator.

use crate::error::{HarnessError, Result};
use crate::models::measurement::Measurement;
use crate::models::metrics::SummaryStats;

pub fn summarize(results: &[Measurement]) -> Result<SummaryStats> {
    if results.is_empty() {
        return Err(HarnessError::Aggregation);
    }

    let mut sorted: Vec<f64> = results.iter().map(Measurement::elapsed_ms).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let n = sorted.len();
    let successful = results.iter().filter(|m| m.success).count();

    Ok(SummaryStats {
        min: sorted[0],
        max: sorted[n - 1],
        average: sorted.iter().sum::<f64>() / n as f64,
        median: nearest_rank(&sorted, n / 2),
        p95: nearest_rank(&sorted, (n as f64 * 0.95).floor() as usize),
        success_rate: 100.0 * successful as f64 / n as f64,
        total: n,
        successful,
    })
}

fn nearest_rank(sorted: &[f64], index: usize) -> f64 {
    sorted[index.min(sorted.len() - 1)]
}
