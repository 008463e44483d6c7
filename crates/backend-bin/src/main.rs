// ============================
// chirpy-backend-bin/src/main.rs
// ============================
//! `chirpy` API server binary.
use std::path::PathBuf;

use anyhow::Context;
use chirpy_backend_lib::{
    auth::rate_limit::DEFAULT_CLEANUP_INTERVAL, config::Settings, router, AppState,
};
use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

/// Chirpy API server
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// TOML config file; defaults to ./config.toml when present
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the bind host
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port
    #[arg(short, long)]
    port: Option<u16>,
}

fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log.level));

    if settings.log.json {
        fmt().json().with_env_filter(filter).init();
    } else {
        fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut settings = match &args.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };
    if let Some(host) = args.host {
        settings.server.host = host;
    }
    if let Some(port) = args.port {
        settings.server.port = port;
    }

    init_tracing(&settings);

    let addr = settings.bind_addr()?;
    let state = AppState::in_memory(settings).context("invalid configuration")?;
    state.login_limiter.spawn_cleanup(DEFAULT_CLEANUP_INTERVAL);
    let app = router::create_router(state);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, app).await?;

    Ok(())
}
