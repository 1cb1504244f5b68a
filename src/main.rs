//! Chat Response Engine — Binary Entrypoint
//! Boots the Axum HTTP server, wiring the engine, background tasks, and
//! middleware.

use std::sync::Arc;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use chat_response_engine::api::{self, AppState};
use chat_response_engine::engine::ResponseEngine;
use chat_response_engine::metrics::Metrics;
use chat_response_engine::session::SessionConfig;
use chat_response_engine::TracingActionSink;

/// Interval for the proactive sweep and session eviction ticks.
const BACKGROUND_TICK_SECS: u64 = 60;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments. This enables
    // FLOWS_CONFIG_PATH / INTENT_CONFIG_PATH / PORT from .env.
    let _ = dotenvy::dotenv();

    init_tracing();

    let engine = Arc::new(ResponseEngine::from_env(Arc::new(TracingActionSink))?);

    let metrics = Metrics::init(SessionConfig::default().max_sessions);

    spawn_background_tasks(engine.clone());

    let state = AppState {
        engine: engine.clone(),
    };
    let router = api::create_router(state).merge(metrics.router());

    let port = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse::<u16>().ok())
        .unwrap_or(8080);
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(%addr, "chat response engine listening");
    axum::serve(listener, router).await?;

    Ok(())
}

/// One ticker drives both maintenance jobs: nudging idle conversations and
/// dropping sessions past the TTL.
fn spawn_background_tasks(engine: Arc<ResponseEngine>) {
    tokio::spawn(async move {
        let mut ticker =
            tokio::time::interval(std::time::Duration::from_secs(BACKGROUND_TICK_SECS));
        loop {
            ticker.tick().await;
            let now = chrono::Utc::now();

            let nudges = engine.proactive_sweep(now).await;
            let evicted = engine.sessions().evict_idle(now);
            if evicted > 0 {
                metrics::counter!("engine_sessions_evicted_total").increment(evicted as u64);
            }

            tracing::debug!(
                target: "engine",
                nudged = nudges.len(),
                evicted,
                open_sessions = engine.sessions().len(),
                "maintenance tick"
            );
        }
    });
}
