pub mod codec;
pub mod config;
pub mod db;
pub mod error;
pub mod web;

use std::sync::Arc;

use anyhow::{Context, Result};
use log::{info, warn};
use tokio::net::TcpListener;

use codec::QrGenerator;
use config::Config;
use db::Database;

/// Handles shared by every request. Built once in [`run`].
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub generator: Arc<QrGenerator>,
}

impl AppState {
    pub fn new(db: Database, generator: QrGenerator) -> Self {
        Self {
            db,
            generator: Arc::new(generator),
        }
    }
}

pub async fn run() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let config = Config::from_env().context("failed to load configuration")?;
    info!("qrshelf starting up...");

    let database = Database::new(config.db_path.clone())
        .with_context(|| format!("failed to open database at {}", config.db_path.display()))?;
    info!("Database initialized at {}", database.path().display());
    let state = AppState::new(database.clone(), QrGenerator::new(config.qr_size));

    let addr = config.listen_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Listening on http://{addr}");

    axum::serve(listener, web::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server failed")?;

    database.close();
    info!("qrshelf stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!("Failed to listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
