//! Analytics Cache - resilient access to a rate-limited analytics API
//!
//! Binary entry point: wires configuration, the upstream adapter, the cache
//! and the HTTP API together.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use analytics_cache::api::{create_router, AppState};
use analytics_cache::{spawn_sweep_task, Config, TwitterSource};

/// Main entry point for the analytics cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the upstream adapter and the cache-aside resolver
/// 4. Start the background sweep when staleness is bounded
/// 5. Serve the Axum router with graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "analytics_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Analytics Cache Server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: ttl={}s, max_staleness={:?}, max_entries={}, port={}, upstream={}",
        config.cache_ttl,
        config.max_staleness,
        config.max_entries,
        config.server_port,
        config.upstream_base_url
    );

    let source = TwitterSource::new(config.upstream_base_url.clone())
        .with_retry_after_floor(config.retry_after_floor);
    let state = AppState::from_config(Arc::new(source), &config);

    // Without a staleness bound every entry remains a fallback candidate;
    // only the LRU bound applies then.
    let sweep_handle = config.max_staleness().map(|retention| {
        spawn_sweep_task(
            state.resolver.cache().clone(),
            config.cleanup_interval,
            retention,
        )
    });

    let app = create_router(state, &config.frontend_url);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(sweep_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then stops the sweep task.
async fn shutdown_signal(sweep_handle: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    if let Some(handle) = sweep_handle {
        handle.abort();
        warn!("Sweep task aborted");
    }
}
