use serde::Serialize;

/// Summary of one non-empty result set. All durations are milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    pub min: f64,
    pub max: f64,
    pub average: f64,
    pub median: f64,
    pub p95: f64,

    /// Percentage in `[0, 100]`.
    pub success_rate: f64,
    pub total: usize,
    pub successful: usize,
}
