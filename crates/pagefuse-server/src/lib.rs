pub mod auth;
pub mod db;
pub mod error;
pub mod routes;
pub mod state;
pub mod worker;

use std::path::PathBuf;
use std::sync::Arc;

use pagefuse::config::PipelineConfig;
use tokio::sync::{mpsc, Mutex};

use state::AppState;

/// Number of pending uploads the work queue holds before `POST /documents`
/// starts applying backpressure.
pub const WORK_QUEUE_CAPACITY: usize = 64;

pub struct ServerArgs {
    pub bind: String,
    pub db_path: String,
    pub config_path: Option<PathBuf>,
    pub workers: usize,
    pub session_secret: String,
}

/// Build the shared state and router, but leave binding/serving to the
/// caller so tests can bind to an ephemeral port.
pub async fn build(args: ServerArgs) -> anyhow::Result<(AppState, axum::Router)> {
    let config = PipelineConfig::load(args.config_path.as_deref())?;
    let conn = db::open(&args.db_path)?;

    let (work_tx, work_rx) = mpsc::channel(WORK_QUEUE_CAPACITY);
    let state = AppState { db: Arc::new(Mutex::new(conn)), work_tx, config: Arc::new(config), session_secret: Arc::new(args.session_secret) };

    worker::spawn_workers(args.workers.max(1), work_rx, state.clone());

    let app = routes::router(state.clone())
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(tower_http::cors::CorsLayer::permissive());

    Ok((state, app))
}

pub async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
