use chrono::{DateTime, Utc};
use meteor_common::Target;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A single resolved request scheduled for execution by a worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub url: String,
}

/// The recorded result of one completed work item.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// When the worker started the request.
    pub timestamp: DateTime<Utc>,
    /// Time until the response head arrived (or the transport failed).
    pub elapsed: Duration,
    /// HTTP status, or 0 when the transport failed.
    pub status_code: u16,
    /// Empty on success.
    pub error_message: String,
    pub target_url: String,
}

impl Outcome {
    pub fn success(timestamp: DateTime<Utc>, elapsed: Duration, status_code: u16, target_url: String) -> Self {
        Self { timestamp, elapsed, status_code, error_message: String::new(), target_url }
    }

    pub fn failure(timestamp: DateTime<Utc>, elapsed: Duration, error_message: String, target_url: String) -> Self {
        Self { timestamp, elapsed, status_code: 0, error_message, target_url }
    }

    /// Any received status counts as a success; only transport errors fail.
    pub fn is_success(&self) -> bool {
        self.error_message.is_empty()
    }
}

/// Which condition ended dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// `rps * duration` work items were dispatched.
    CapReached,
    /// The run's wall-clock deadline fired first.
    Deadline,
    /// Stopped from outside the engine (e.g. Ctrl-C in the CLI).
    Cancelled,
}

impl StopReason {
    pub fn as_name(&self) -> &'static str {
        match self {
            StopReason::CapReached => "cap_reached",
            StopReason::Deadline => "deadline",
            StopReason::Cancelled => "cancelled",
        }
    }
}

/// Everything a finished run produced. `outcomes` is in recording order, which
/// is not dispatch order.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    /// Targets with normalized weights.
    pub targets: Vec<Target>,
    pub requests_per_second: u32,
    pub concurrency: u32,
    pub duration_seconds: u32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub outcomes: Vec<Outcome>,
    /// Work items pushed to the queue. Always equals `outcomes.len()`.
    pub dispatched: u64,
    pub stop_reason: StopReason,
}

impl ResultSet {
    /// Wall clock of the whole run, including the drain after dispatch stopped.
    pub fn wall_clock(&self) -> Duration {
        (self.end_time - self.start_time).to_std().unwrap_or_default()
    }
}
