//! Caching Proxy - A forwarding HTTP/1.0 proxy
//!
//! Relays GET requests to origin servers and keeps small responses in a
//! fixed-size, clock-evicted cache shared by all connections.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use caching_proxy::admin::{create_router, AdminState};
use caching_proxy::{server, spawn_stats_reporter, Cli, Config, SharedCache};

/// Main entry point for the caching proxy.
///
/// # Startup Sequence
/// 1. Parse the listening port (usage errors exit with status 2)
/// 2. Initialize tracing subscriber for logging
/// 3. Load tunables from environment variables
/// 4. Create the shared cache
/// 5. Start the optional stats reporter and admin API
/// 6. Accept proxy connections until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "caching_proxy=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_cli(&cli);
    info!(
        "Configuration loaded: port={}, max_cache_entries={}, max_object_size={}, admin_port={:?}",
        config.listen_port, config.max_cache_entries, config.max_object_size, config.admin_port
    );

    let cache = Arc::new(SharedCache::from_config(&config));

    let mut background: Vec<JoinHandle<()>> = Vec::new();

    if config.stats_interval > 0 {
        background.push(spawn_stats_reporter(cache.clone(), config.stats_interval));
    }

    if let Some(admin_port) = config.admin_port {
        background.push(spawn_admin(cache.clone(), admin_port).await?);
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.listen_port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to listen on {}", addr))?;
    info!("Proxy listening on {}", addr);

    server::run(listener, cache.clone(), shutdown_signal()).await?;

    cache.close();
    for task in background {
        task.abort();
    }
    info!("Proxy shutdown complete");

    Ok(())
}

/// Binds the admin API and serves it on a background task.
async fn spawn_admin(cache: Arc<SharedCache>, port: u16) -> anyhow::Result<JoinHandle<()>> {
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind admin API on {}", addr))?;
    info!("Admin API listening on http://{}", addr);

    let app = create_router(AdminState::new(cache));
    Ok(tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, app).await {
            error!("admin API stopped: {}", err);
        }
    }))
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", err);
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
}
