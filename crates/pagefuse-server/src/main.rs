use std::path::PathBuf;

use clap::Parser;
use pagefuse_server::{build, shutdown_signal, ServerArgs};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pagefuse-server", about = "HTTP ingestion service for the page reconstruction pipeline")]
struct Args {
    #[arg(long, default_value = "0.0.0.0:8080")]
    bind: String,

    #[arg(long, default_value = "pagefuse.sqlite3")]
    db_path: String,

    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value_t = num_cpus::get())]
    workers: usize,

    /// Shared secret checked against the `session` cookie on every route but
    /// the health check. Falls back to `PAGEFUSE_SESSION_SECRET`, and then to
    /// an insecure placeholder suitable only for local development.
    #[arg(long)]
    session_secret: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let args = Args::parse();
    let bind = args.bind.clone();
    let session_secret = args.session_secret.or_else(|| std::env::var("PAGEFUSE_SESSION_SECRET").ok()).unwrap_or_else(|| {
        tracing::warn!("no session secret configured, using an insecure development default");
        "dev-only-insecure-secret".to_string()
    });
    let (_, app) =
        build(ServerArgs { bind: args.bind, db_path: args.db_path, config_path: args.config, workers: args.workers, session_secret }).await?;

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!(addr = %bind, "pagefuse-server listening");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}
