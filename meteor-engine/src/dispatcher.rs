use rand::Rng;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::outcome::{StopReason, WorkItem};
use crate::selector::TargetSelector;

/// Shared stop signal for one run.
///
/// Dispatch ends on whichever of {cap reached, deadline, external cancel}
/// calls [`StopSignal::stop`] first. That first reason is kept; later calls
/// return `false` and change nothing.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    token: CancellationToken,
    reason: Arc<OnceLock<StopReason>>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if this call was the one that stopped the run.
    pub fn stop(&self, reason: StopReason) -> bool {
        let won = self.reason.set(reason).is_ok();
        self.token.cancel();
        won
    }

    pub fn reason(&self) -> Option<StopReason> {
        self.reason.get().copied()
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }

    pub async fn stopped(&self) {
        self.token.cancelled().await
    }
}

/// Pacing for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchPlan {
    pub interval: Duration,
    /// Nominal cap: `rps * duration`.
    pub cap: u64,
    pub deadline: Duration,
}

impl DispatchPlan {
    pub fn new(requests_per_second: u32, duration_seconds: u32) -> Self {
        let rps = requests_per_second.max(1);
        Self {
            interval: (Duration::from_secs(1) / rps).max(Duration::from_nanos(1)),
            cap: u64::from(rps) * u64::from(duration_seconds),
            deadline: Duration::from_secs(u64::from(duration_seconds)),
        }
    }

    /// Queue capacity that lets every dispatch succeed without waiting on workers.
    pub fn queue_capacity(&self) -> usize {
        usize::try_from(self.cap)
            .unwrap_or(usize::MAX)
            .clamp(1, tokio::sync::Semaphore::MAX_PERMITS)
    }
}

/// Push one selected target per tick until the cap is reached or `stop` fires.
/// Returns the number of items pushed. Dropping `queue` on return closes it.
///
/// The first tick fires immediately. The queue is sized to the cap, so a push
/// never waits on workers: dispatch timing is independent of worker
/// throughput, and when workers fall behind the queued backlog is still
/// drained after dispatch has stopped, past the nominal deadline.
///
/// The stop signal is polled before the ticker, so once the deadline has fired
/// no further tick is dispatched even if it is ready at the same instant.
pub async fn dispatch<R: Rng>(
    plan: &DispatchPlan,
    selector: &mut TargetSelector<R>,
    queue: mpsc::Sender<WorkItem>,
    stop: &StopSignal,
) -> u64 {
    let mut ticker = interval(plan.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut dispatched: u64 = 0;

    loop {
        tokio::select! {
            biased;
            _ = stop.stopped() => break,
            _ = ticker.tick() => {
                if dispatched >= plan.cap {
                    stop.stop(StopReason::CapReached);
                    break;
                }
                let item = WorkItem { url: selector.select().to_string() };
                if let Err(e) = queue.try_send(item) {
                    tracing::warn!(error = %e, dispatched, "work queue rejected item, stopping dispatch");
                    stop.stop(StopReason::Cancelled);
                    break;
                }
                dispatched += 1;
            }
        }
    }

    dispatched
}

/// Stop the run with [`StopReason::Deadline`] after `after`, unless something
/// else stops it first.
pub fn spawn_deadline(stop: StopSignal, after: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = stop.stopped() => {}
            _ = sleep(after) => {
                if stop.stop(StopReason::Deadline) {
                    tracing::debug!(?after, "deadline reached");
                }
            }
        }
    })
}
