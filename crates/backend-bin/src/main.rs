// ============================
// records-backend-bin/src/main.rs
// ============================
//! Tokio / Axum entry-point for the employee-records server.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use backend_lib::{config::Settings, create_router, AppState};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const THROTTLE_CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[derive(Parser, Debug)]
#[command(name = "records-server", version, about = "Employee records HTTP server")]
struct Cli {
    /// TOML config file; `config.toml` in the working directory otherwise
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the bind address from the config
    #[arg(short, long)]
    bind: Option<SocketAddr>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let json_layer = json.then(|| fmt::layer().json());
    let plain_layer = (!json).then(fmt::layer);

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(plain_layer)
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        return;
    }
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };
    if let Some(bind) = cli.bind {
        settings.bind_addr = bind;
    }
    settings.validate().context("invalid configuration")?;

    init_tracing(&settings.log_level, cli.json_logs);

    let addr = settings.bind_addr;
    info!(storage = ?settings.storage, data_dir = %settings.data_dir.display(), "starting");
    let state = AppState::from_settings(settings)?;

    let throttle = state.throttle.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(THROTTLE_CLEANUP_INTERVAL);
        loop {
            ticker.tick().await;
            throttle.cleanup();
        }
    });

    let app = create_router(state);
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
