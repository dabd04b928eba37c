mod cli;

use crate::cli::{StorageBackendArg, CLI};
use anyhow::Context;
use clap::Parser;
use shortlink_gateway::telemetry::init_tracing;
use shortlink_gateway::{App, AppState};
use shortlink_service::ShortlinkService;
use shortlink_storage::{InMemoryStore, KvStore, RedisStore, RedisStoreSettings};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::parse();
    init_tracing(config.log_format).context("failed to install tracing subscriber")?;

    info!(
        listen_addr = %config.listen_addr,
        storage_backend = %config.storage,
        "starting shortlink gateway"
    );

    match config.storage {
        StorageBackendArg::InMemory => {
            warn!("in-memory storage is per process and lost on restart");
            run_server(config.listen_addr, InMemoryStore::new()).await?;
        }
        StorageBackendArg::Redis => {
            let settings = RedisStoreSettings::builder()
                .addr(config.redis_addr)
                .password_opt(config.redis_password)
                .db(config.redis_db)
                .key_prefix(config.redis_key_prefix)
                .build();

            let store = RedisStore::connect(settings)
                .await
                .context("redis connectivity check failed")?;
            run_server(config.listen_addr, store).await?;
        }
    }

    Ok(())
}

async fn run_server<S: KvStore>(
    listen_addr: std::net::SocketAddr,
    store: S,
) -> anyhow::Result<()> {
    let state = AppState::new(Arc::new(ShortlinkService::new(store)));
    let router = App::router(state);

    let listener = TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("failed to bind {listen_addr}"))?;
    info!(listen_addr = %listener.local_addr()?, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
