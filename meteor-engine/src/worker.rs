use chrono::Utc;
use meteor_common::{MeteorError, Result};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use crate::collector::Collector;
use crate::outcome::{Outcome, WorkItem};

/// Client-level timeout applied to every request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Receiving end of the work queue, shared by every worker.
pub type WorkQueue = Arc<Mutex<mpsc::Receiver<WorkItem>>>;

pub fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| MeteorError::HttpClient(e.to_string()))
}

/// Start `count` workers pulling from `queue`. Each handle resolves to the
/// number of items that worker completed once the queue is closed and empty.
pub fn spawn_workers(
    count: usize,
    client: reqwest::Client,
    queue: WorkQueue,
    collector: Collector,
) -> Vec<JoinHandle<u64>> {
    (0..count)
        .map(|id| {
            let client = client.clone();
            let queue = Arc::clone(&queue);
            let collector = collector.clone();
            tokio::spawn(worker_loop(id, client, queue, collector))
        })
        .collect()
}

async fn worker_loop(id: usize, client: reqwest::Client, queue: WorkQueue, collector: Collector) -> u64 {
    let mut completed: u64 = 0;
    loop {
        // The queue lock is released before the request goes out.
        let item = queue.lock().await.recv().await;
        let Some(item) = item else { break };

        collector.record(execute(&client, item).await);
        completed += 1;
    }
    tracing::debug!(worker = id, completed, "worker finished");
    completed
}

/// Issue one GET for `item` and describe what happened. Never retries.
///
/// On a response the body is drained before returning so the connection can be
/// reused; `elapsed` covers only the time until the response head arrived.
pub async fn execute(client: &reqwest::Client, item: WorkItem) -> Outcome {
    let timestamp = Utc::now();
    let start = Instant::now();
    let result = client.get(&item.url).send().await;
    let elapsed = start.elapsed();

    match result {
        Ok(response) => {
            let status = response.status().as_u16();
            // Body read failures after the head arrived do not change the outcome.
            let _ = response.bytes().await;
            Outcome::success(timestamp, elapsed, status, item.url)
        }
        Err(e) => Outcome::failure(timestamp, elapsed, describe_error(&e), item.url),
    }
}

/// Render an error with its whole source chain, e.g.
/// `error sending request for url (...): client error (Connect): Connection refused`.
pub fn describe_error(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !text.is_empty() && !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    if message.is_empty() {
        message = "request failed".to_string();
    }
    message
}
