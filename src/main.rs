mod config;
mod errors;
mod executor;
mod handlers;
mod limiter;
mod models;
mod queue;
mod services;
mod state;

use std::sync::Arc;

use anyhow::Context;
use axum::{routing::post, Router};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::executor::TaskExecutor;
use crate::limiter::RateLimiter;
use crate::queue::{LogObserver, QueueRegistry};
use crate::services::FileSink;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize basic tracing subscriber
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::load().context("Failed to load configuration")?;

    // Completion log sink and the executor writing through it
    let sink = Arc::new(FileSink::new(&config.task_log.path));
    let executor = Arc::new(TaskExecutor::new(sink));

    // Per-user queues, with one completion observer bound per queue
    let registry = Arc::new(QueueRegistry::new(
        executor,
        Arc::new(LogObserver),
        config.queue.clone(),
    ));
    registry.start_sweep_task(config.queue.sweep_interval());

    // Admission control, with the same housekeeping cadence
    let limiter = Arc::new(RateLimiter::new(&config.rate_limit));
    limiter.start_cleanup_task(config.queue.sweep_interval());

    let state = AppState { limiter, registry };

    let app = Router::new()
        .route("/task", post(handlers::submit_task))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Server running on {}", addr);
    axum::serve(listener, app.into_make_service())
        .await
        .context("Server error")?;

    Ok(())
}
