//! Load-test execution engine: weighted target selection, fixed-rate
//! dispatch, a concurrent worker pool, outcome collection and post-run
//! statistics.
//!
//! Data flows one way: selector -> dispatcher -> workers -> collector ->
//! [`stats::compute`].

use chrono::Utc;
use meteor_common::{LoadTestConfig, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};

pub mod collector;
pub mod dispatcher;
pub mod outcome;
pub mod selector;
pub mod stats;
pub mod worker;

pub use collector::Collector;
pub use dispatcher::{DispatchPlan, StopSignal};
pub use outcome::{Outcome, ResultSet, StopReason, WorkItem};
pub use selector::TargetSelector;
pub use stats::{compute, LatencySummary, Statistics};

/// Engine tuning that is not part of the load-test configuration itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    pub request_timeout: Duration,
    /// Seed for target selection; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self { request_timeout: worker::REQUEST_TIMEOUT, seed: None }
    }
}

/// One prepared load test. Construction is the only fallible step; once
/// [`LoadTest::run`] starts it always returns a [`ResultSet`].
pub struct LoadTest {
    config: LoadTestConfig,
    client: reqwest::Client,
    selector: TargetSelector,
    stop: StopSignal,
}

impl LoadTest {
    pub fn new(config: LoadTestConfig) -> Result<Self> {
        Self::with_options(config, EngineOptions::default())
    }

    pub fn with_options(config: LoadTestConfig, options: EngineOptions) -> Result<Self> {
        config.validate()?;
        let client = worker::build_client(options.request_timeout)?;
        let selector = match options.seed {
            Some(seed) => TargetSelector::seeded(&config.targets, seed),
            None => TargetSelector::new(&config.targets),
        };
        Ok(Self { config, client, selector, stop: StopSignal::new() })
    }

    /// Handle for ending dispatch early with [`StopReason::Cancelled`].
    /// Items already queued are still executed.
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    pub fn config(&self) -> &LoadTestConfig {
        &self.config
    }

    /// Start the workers, dispatch until the cap or deadline, drain the queue
    /// and return the frozen results.
    pub async fn run(mut self) -> ResultSet {
        let plan = DispatchPlan::new(self.config.requests_per_second, self.config.duration_seconds);
        tracing::info!(
            rps = self.config.requests_per_second,
            concurrency = self.config.concurrency,
            duration_secs = self.config.duration_seconds,
            cap = plan.cap,
            "starting load test"
        );

        let start_time = Utc::now();
        let (tx, rx) = mpsc::channel(plan.queue_capacity());
        let queue = Arc::new(Mutex::new(rx));
        let collector = Collector::with_capacity(plan.queue_capacity().min(1 << 16));

        let workers = worker::spawn_workers(
            self.config.concurrency as usize,
            self.client.clone(),
            queue,
            collector.clone(),
        );
        let deadline = dispatcher::spawn_deadline(self.stop.clone(), plan.deadline);

        let dispatched = dispatcher::dispatch(&plan, &mut self.selector, tx, &self.stop).await;
        deadline.abort();
        // dispatch() always records a reason before returning.
        let stop_reason = self.stop.reason().unwrap_or(StopReason::Cancelled);
        tracing::info!(dispatched, reason = stop_reason.as_name(), "dispatch stopped, draining");

        for handle in workers {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "worker task failed");
            }
        }
        let end_time = Utc::now();
        let outcomes = collector.take();
        tracing::info!(completed = outcomes.len(), "load test finished");

        ResultSet {
            targets: self.selector.targets().to_vec(),
            requests_per_second: self.config.requests_per_second,
            concurrency: self.config.concurrency,
            duration_seconds: self.config.duration_seconds,
            start_time,
            end_time,
            outcomes,
            dispatched,
            stop_reason,
        }
    }
}
