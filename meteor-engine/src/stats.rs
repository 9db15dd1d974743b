use std::collections::BTreeMap;
use std::time::Duration;

use crate::outcome::ResultSet;

/// Latency figures over every outcome, successes and failures alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencySummary {
    pub min: Duration,
    pub avg: Duration,
    pub median: Duration,
    pub p95: Duration,
    pub p99: Duration,
    pub max: Duration,
}

/// Read-only summary of a finished run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Statistics {
    pub total_requests: u64,
    pub success_requests: u64,
    pub failed_requests: u64,
    /// Wall clock of the run, not the sum of request latencies.
    pub total_duration: Duration,
    /// `None` when no request completed.
    pub latency: Option<LatencySummary>,
    /// Successes only; transport failures are never tallied here.
    pub status_code_counts: BTreeMap<u16, u64>,
    pub target_counts: BTreeMap<String, u64>,
    pub requests_per_sec: f64,
}

impl Statistics {
    pub fn success_rate(&self) -> f64 {
        if self.total_requests == 0 {
            return 0.0;
        }
        self.success_requests as f64 / self.total_requests as f64
    }
}

/// Reduce a frozen result set to its summary.
pub fn compute(results: &ResultSet) -> Statistics {
    let total_duration = results.wall_clock();
    let mut stats = Statistics {
        total_requests: results.outcomes.len() as u64,
        total_duration,
        ..Statistics::default()
    };

    if results.outcomes.is_empty() {
        return stats;
    }

    let mut durations: Vec<Duration> = Vec::with_capacity(results.outcomes.len());
    for outcome in &results.outcomes {
        if outcome.is_success() {
            stats.success_requests += 1;
            *stats.status_code_counts.entry(outcome.status_code).or_insert(0) += 1;
        } else {
            stats.failed_requests += 1;
        }
        *stats.target_counts.entry(outcome.target_url.clone()).or_insert(0) += 1;
        durations.push(outcome.elapsed);
    }
    durations.sort_unstable();

    let total_nanos: u128 = durations.iter().map(Duration::as_nanos).sum();
    let avg_nanos = total_nanos / durations.len() as u128;

    stats.latency = Some(LatencySummary {
        min: durations[0],
        avg: Duration::from_nanos(u64::try_from(avg_nanos).unwrap_or(u64::MAX)),
        median: durations[durations.len() / 2],
        p95: percentile(&durations, 0.95),
        p99: percentile(&durations, 0.99),
        max: durations[durations.len() - 1],
    });

    let secs = total_duration.as_secs_f64();
    stats.requests_per_sec = if secs > 0.0 { stats.total_requests as f64 / secs } else { 0.0 };
    stats
}

/// Element at index `floor(p * n)` of an ascending, non-empty slice.
/// For n = 10 both p95 and p99 land on index 9.
fn percentile(sorted: &[Duration], p: f64) -> Duration {
    let idx = (p * sorted.len() as f64).floor() as usize;
    sorted[idx.min(sorted.len() - 1)]
}
