mod cleanup;
mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;

use board_api::AppStateInner;
use board_contract::{MemoryStore, MessageBoard, RecordStore};
use board_db::Database;

use crate::config::{Config, Storage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "board=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    // Init storage
    let store: Arc<dyn RecordStore> = match &config.storage {
        Storage::Memory => {
            info!("Using in-memory store; messages are lost on restart");
            Arc::new(MemoryStore::new())
        }
        Storage::Sqlite(path) => Arc::new(Database::open(path)?),
    };

    // Shared state
    let state = AppStateInner::start(
        Arc::new(MessageBoard::new(store)),
        config.jwt_secret.clone(),
        config.contract_id.clone(),
        config.app_name.clone(),
    );

    // Background receipt pruning (runs every minute)
    tokio::spawn(cleanup::run_cleanup_loop(
        state.executor.clone(),
        config.receipt_retention_secs,
        60,
    ));

    let app = board_api::router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("{} serving {} on {}", config.app_name, config.contract_id, addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
