//! Axum-based HTTP entry point with body limits and timeouts.
//!
//! - `POST /bot/send-message` runs one turn for `{"prompt": ...}`
//! - `GET /health` liveness probe
//! - Request body size limit (64KB)
//! - Request timeout derived from the configured turn budget
//!
//! Turns run on a spawned task, so a timed-out or dropped request never
//! cancels a command batch that has already started.

mod handlers;

pub use handlers::{handle_health, handle_send_message};

use crate::bot::Orchestrator;
use crate::config::Config;
use anyhow::{Context, Result};
use axum::{
    Router,
    http::StatusCode,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

/// Maximum request body size (64KB)
pub const MAX_BODY_SIZE: usize = 65_536;
/// Floor for the request timeout (300s).
pub const REQUEST_TIMEOUT_SECS: u64 = 300;

/// Worst-case turn length: every round hits the model deadline and fetches
/// once, plus the final batch, never below [`REQUEST_TIMEOUT_SECS`].
pub fn request_timeout(config: &Config) -> Duration {
    let rounds = u64::from(config.orchestrator.max_rounds.max(1));
    let per_round = config
        .agent
        .timeout_secs
        .saturating_add(config.commands.timeout_secs);
    let budget = rounds
        .saturating_mul(per_round)
        .saturating_add(config.commands.timeout_secs);
    Duration::from_secs(budget.max(REQUEST_TIMEOUT_SECS))
}

/// Shared state for all axum handlers.
///
/// The mutex keeps exactly one turn in flight against the memory store.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Mutex<Orchestrator>>,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator: Arc::new(Mutex::new(orchestrator)),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
        }
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Request body for `POST /bot/send-message`.
#[derive(Debug, serde::Deserialize)]
pub struct SendMessageBody {
    #[serde(default)]
    pub prompt: Option<String>,
}

pub fn router(state: AppState) -> Router {
    let timeout = state.request_timeout;
    Router::new()
        .route("/health", get(handle_health))
        .route("/bot/send-message", post(handle_send_message))
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .layer(CorsLayer::permissive())
}

/// Bind `host:port` and serve until the process is stopped.
pub async fn run_gateway(
    host: &str,
    port: u16,
    orchestrator: Orchestrator,
    request_timeout: Duration,
) -> Result<()> {
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("invalid gateway address {host}:{port}"))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    run_gateway_with_listener(listener, orchestrator, request_timeout).await
}

/// Serve from a pre-bound listener.
pub async fn run_gateway_with_listener(
    listener: tokio::net::TcpListener,
    orchestrator: Orchestrator,
    request_timeout: Duration,
) -> Result<()> {
    let local = listener.local_addr()?;
    tracing::info!(
        addr = %local,
        timeout_secs = request_timeout.as_secs(),
        "gateway listening"
    );
    println!("◆ Conscia gateway listening on http://{local}");
    println!("  POST /bot/send-message");
    println!("  GET  /health");

    let app = router(AppState::new(orchestrator).with_request_timeout(request_timeout));
    axum::serve(listener, app).await?;
    Ok(())
}
