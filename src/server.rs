//! HTTP server initialization and runtime setup.
//!
//! Handles store connection, service wiring, and Axum server lifecycle.

use crate::application::services::{LinkService, RateLimiter};
use crate::config::Config;
use crate::domain::store::KeyValueStore;
use crate::infrastructure::store::{MemoryStore, RedisStore};
use crate::routes::app_router;
use crate::state::AppState;
use crate::utils::code_generator::CodeGenerator;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// How often the in-memory store drops expired entries.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Connects the configured store backend.
///
/// Redis when a Redis URL is configured, otherwise the in-process store with
/// a background sweeper. A Redis connection failure is fatal.
pub async fn connect_store(config: &Config) -> Result<Arc<dyn KeyValueStore>> {
    match &config.redis_url {
        Some(redis_url) => {
            let store = RedisStore::connect(redis_url, config.store_connect_retries)
                .await
                .context("Failed to connect to Redis")?;
            tracing::info!("Store enabled (Redis)");
            Ok(Arc::new(store))
        }
        None => {
            let store = Arc::new(MemoryStore::new());
            store.spawn_sweeper(SWEEP_INTERVAL);
            tracing::warn!("No Redis configured; using in-memory store (not shared, lost on restart)");
            Ok(store)
        }
    }
}

/// Wires the link service and its collaborators over `store`.
pub fn build_state(config: &Config, store: Arc<dyn KeyValueStore>) -> AppState {
    let generator = CodeGenerator::new(config.code_length, config.code_max_attempts);
    let rate_limiter = RateLimiter::new(store.clone(), config.rate_limit_policy());
    let link_service = LinkService::new(
        store.clone(),
        generator,
        rate_limiter,
        config.link_settings(),
    );

    AppState::new(Arc::new(link_service), store, config.behind_proxy)
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Key-value store (Redis or in-memory fallback)
/// - Link service, code generator and rate limiter
/// - Axum HTTP server with graceful shutdown
///
/// The store is closed after the server has drained.
///
/// # Errors
///
/// Returns an error if:
/// - Redis is configured but unreachable
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let store = connect_store(&config).await?;
    let state = build_state(&config, store.clone());

    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid LISTEN address: {}", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped, closing store");
    store.close().await?;

    Ok(())
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl-C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
