use meteor_common::{MeteorError, Result};
use meteor_engine::{ResultSet, Statistics};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;

use crate::{io_error, millis};

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonReport {
    pub targets: Vec<JsonTarget>,
    pub rps: u32,
    pub concurrency: u32,
    pub duration: u32,
    pub start_time: String,
    pub end_time: String,
    pub stop_reason: String,
    pub statistics: JsonStatistics,
    pub status_codes: BTreeMap<u16, u64>,
    pub target_counts: BTreeMap<String, u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requests: Vec<JsonRequest>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonTarget {
    pub url: String,
    pub weight: f64,
}

/// Durations are whole milliseconds; latency fields are 0 when nothing completed.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct JsonStatistics {
    pub total_requests: u64,
    pub success_requests: u64,
    pub failed_requests: u64,
    pub total_duration_ms: u64,
    pub min_duration_ms: u64,
    pub max_duration_ms: u64,
    pub avg_duration_ms: u64,
    pub median_duration_ms: u64,
    pub p95_duration_ms: u64,
    pub p99_duration_ms: u64,
    pub requests_per_sec: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRequest {
    pub timestamp: String,
    pub url: String,
    pub duration_ms: u64,
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
}

impl JsonReport {
    pub fn new(results: &ResultSet, stats: &Statistics) -> Self {
        let mut statistics = JsonStatistics {
            total_requests: stats.total_requests,
            success_requests: stats.success_requests,
            failed_requests: stats.failed_requests,
            total_duration_ms: millis(stats.total_duration),
            requests_per_sec: stats.requests_per_sec,
            ..JsonStatistics::default()
        };
        if let Some(latency) = &stats.latency {
            statistics.min_duration_ms = millis(latency.min);
            statistics.max_duration_ms = millis(latency.max);
            statistics.avg_duration_ms = millis(latency.avg);
            statistics.median_duration_ms = millis(latency.median);
            statistics.p95_duration_ms = millis(latency.p95);
            statistics.p99_duration_ms = millis(latency.p99);
        }

        Self {
            targets: results
                .targets
                .iter()
                .map(|t| JsonTarget { url: t.url.clone(), weight: t.weight })
                .collect(),
            rps: results.requests_per_second,
            concurrency: results.concurrency,
            duration: results.duration_seconds,
            start_time: results.start_time.to_rfc3339(),
            end_time: results.end_time.to_rfc3339(),
            stop_reason: results.stop_reason.as_name().to_string(),
            statistics,
            status_codes: stats.status_code_counts.clone(),
            target_counts: stats.target_counts.clone(),
            requests: results
                .outcomes
                .iter()
                .map(|o| JsonRequest {
                    timestamp: o.timestamp.to_rfc3339(),
                    url: o.target_url.clone(),
                    duration_ms: millis(o.elapsed),
                    status_code: o.status_code,
                    error: o.error_message.clone(),
                })
                .collect(),
        }
    }
}

/// Pretty-printed JSON followed by a newline.
pub fn write_json(results: &ResultSet, stats: &Statistics, out: &mut impl Write) -> Result<()> {
    let report = JsonReport::new(results, stats);
    serde_json::to_writer_pretty(&mut *out, &report).map_err(|e| MeteorError::Report(e.to_string()))?;
    writeln!(out).map_err(io_error)
}
