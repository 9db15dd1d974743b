use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, SecondsFormat, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub mod config;
use config::{DELAY_JITTER, SLOW_DELAY};

/// Source of uniform rolls in `[0, 1)`, abstracted for testability.
pub trait Roller: Send + Sync {
    fn roll(&self) -> f64;
}

/// Production roller backed by the thread-local RNG.
pub struct ThreadRoller;

impl Roller for ThreadRoller {
    fn roll(&self) -> f64 {
        rand::thread_rng().gen()
    }
}

/// Responder configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub address: SocketAddr,
    /// Base delay for `GET /`.
    pub delay: Duration,
    /// Probability in `[0, 1]` that `GET /` answers 500.
    pub error_rate: f64,
    /// Vary `delay` by up to +-50%.
    pub random_delay: bool,
}

#[derive(Clone)]
pub struct AppState {
    pub config: ServerConfig,
    pub request_count: Arc<AtomicU64>,
    pub started_at: DateTime<Utc>,
    pub started: Instant,
    pub roller: Arc<dyn Roller>,
}

impl AppState {
    pub fn new(config: ServerConfig, roller: Arc<dyn Roller>) -> Self {
        Self {
            config,
            request_count: Arc::new(AtomicU64::new(0)),
            started_at: Utc::now(),
            started: Instant::now(),
            roller,
        }
    }

    pub fn requests(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }

    fn count_request(&self) {
        self.request_count.fetch_add(1, Ordering::Relaxed);
    }
}

/// Body of the delayed endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct DelayedResponse {
    pub status: String,
    pub timestamp: String,
    pub delay_ms: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total_requests: u64,
    pub uptime: String,
    pub start_time: String,
}

/// Test responder for exercising the load generator
pub struct Server {
    config: ServerConfig,
}

impl Server {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    pub fn address(&self) -> SocketAddr {
        self.config.address
    }

    pub fn create_router(state: AppState) -> Router {
        Router::new()
            .route("/", get(handle_root))
            .route("/health", get(handle_health))
            .route("/stats", get(handle_stats))
            .route("/slow", get(handle_slow))
            .route("/error", get(handle_error))
            .with_state(state)
    }

    /// Run the responder, signalling `ready_tx` with the bound address once accepting connections
    pub async fn run(self, ready_tx: tokio::sync::oneshot::Sender<SocketAddr>) -> Result<(), Box<dyn std::error::Error>> {
        let state = AppState::new(self.config.clone(), Arc::new(ThreadRoller));
        let app = Self::create_router(state);
        let listener = tokio::net::TcpListener::bind(self.config.address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(
            addr = %local_addr,
            delay_ms = self.config.delay.as_millis() as u64,
            error_rate = self.config.error_rate,
            random_delay = self.config.random_delay,
            "responder listening"
        );
        ready_tx.send(local_addr).ok();
        axum::serve(listener, app).await?;
        Ok(())
    }
}

/// Base delay, optionally shifted by `(2 * roll - 1) * 50%` of itself.
pub fn effective_delay(base: Duration, random: bool, roll: f64) -> Duration {
    if !random {
        return base;
    }
    let shift = (2.0 * roll - 1.0) * DELAY_JITTER;
    base.mul_f64((1.0 + shift).max(0.0))
}

fn delayed_body(delay: Duration) -> Json<DelayedResponse> {
    Json(DelayedResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        delay_ms: delay.as_millis() as u64,
    })
}

/// Handler for GET /: fails with 500 at the configured rate, otherwise
/// sleeps for the configured delay.
pub async fn handle_root(State(state): State<AppState>) -> Response {
    state.count_request();
    tracing::debug!("GET /");

    if state.config.error_rate > 0.0 && state.roller.roll() < state.config.error_rate {
        return (StatusCode::INTERNAL_SERVER_ERROR, "Random error").into_response();
    }

    let delay = effective_delay(state.config.delay, state.config.random_delay, state.roller.roll());
    tokio::time::sleep(delay).await;
    delayed_body(delay).into_response()
}

/// Handler for GET /health: no delay, not counted.
pub async fn handle_health() -> Response {
    Json(serde_json::json!({ "status": "healthy" })).into_response()
}

pub async fn handle_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        total_requests: state.requests(),
        uptime: format!("{:.3}s", state.started.elapsed().as_secs_f64()),
        start_time: state.started_at.to_rfc3339_opts(SecondsFormat::Secs, true),
    })
}

pub async fn handle_slow(State(state): State<AppState>) -> Response {
    state.count_request();
    tokio::time::sleep(SLOW_DELAY).await;
    delayed_body(SLOW_DELAY).into_response()
}

pub async fn handle_error(State(state): State<AppState>) -> Response {
    state.count_request();
    (StatusCode::INTERNAL_SERVER_ERROR, "Intentional error").into_response()
}
