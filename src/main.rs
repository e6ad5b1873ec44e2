//! Affinity HTTP server entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use affinity::bandit::BanditPool;
use affinity::config::Config;
use affinity::embedding::{AttributeEmbedder, HashingEmbedder, HttpEmbedder, HttpEmbedderConfig};
use affinity::engine::MatchEngine;
use affinity::gateway::{HandlerState, create_router_with_state};
use affinity::lifecycle::{DehydrationResult, HydrationResult, LifecycleConfig, LifecycleManager};
use affinity::storage::{ArmStore, FileArmStore};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check());
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;
    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        top_k = config.top_k,
        confidence = config.warm_start_confidence,
        "Affinity starting"
    );

    let embedder: Arc<dyn AttributeEmbedder> = match &config.embedder_url {
        Some(url) => {
            let http_config = HttpEmbedderConfig::new(url.clone()).timeout(config.embed_timeout);
            Arc::new(HttpEmbedder::new(http_config)?)
        }
        None => {
            tracing::warn!("No AFFINITY_EMBEDDER_URL configured, using local hashing embedder");
            Arc::new(HashingEmbedder::new())
        }
    };

    let pool = Arc::new(BanditPool::new());
    let engine = Arc::new(MatchEngine::from_config(&config, embedder)?.with_pool(Arc::clone(&pool)));

    let store = FileArmStore::new(config.storage_path.clone());
    if let Err(e) = store.ensure_storage_path() {
        tracing::warn!(
            path = %config.storage_path.display(),
            error = %e,
            "Storage path unavailable; snapshots will retry and may degrade durability"
        );
    }
    let store: Arc<dyn ArmStore> = Arc::new(store);

    let lifecycle_config = LifecycleConfig::from_env()?.scope(config.pool_scope.clone());
    let lifecycle = Arc::new(LifecycleManager::new(lifecycle_config, pool, store));

    tracing::info!(scope = %config.pool_scope, "Hydrating pool state...");
    match lifecycle.hydrate().await? {
        HydrationResult::Restored { report } => tracing::info!(
            inserted = report.inserted,
            overwritten = report.overwritten,
            "Hydration complete."
        ),
        HydrationResult::NotFound => tracing::info!("No saved state. Starting empty."),
        HydrationResult::Unavailable { reason } => {
            tracing::warn!("State store unavailable: {}. Starting empty.", reason)
        }
    }

    let snapshot_task = lifecycle.start_snapshot_task();

    let state = HandlerState::new(
        engine,
        Some(Arc::clone(&lifecycle)),
        config.storage_path.clone(),
    );
    let app = create_router_with_state(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal_with_lifecycle(Arc::clone(&lifecycle)))
        .await?;

    snapshot_task.abort();
    tracing::info!("Affinity shutdown complete");
    Ok(())
}

fn run_health_check() -> i32 {
    let port = std::env::var("AFFINITY_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let url = format!("http://127.0.0.1:{}/healthz", port);

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(_) => return 1,
    };

    rt.block_on(async {
        let client = match reqwest::Client::builder()
            .timeout(Duration::from_secs(1))
            .build()
        {
            Ok(client) => client,
            Err(_) => return 1,
        };

        match client.get(&url).send().await {
            Ok(res) if res.status().is_success() => 0,
            _ => 1,
        }
    })
}

async fn shutdown_signal_with_lifecycle(lifecycle: Arc<LifecycleManager>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
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
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }

    tracing::info!("Saving pool state...");
    match lifecycle.shutdown().await {
        Ok(Some(DehydrationResult::Saved { arms })) => {
            tracing::info!(arms, "Final snapshot saved.")
        }
        Ok(Some(DehydrationResult::Degraded { attempts, reason })) => {
            tracing::error!(attempts, "Final snapshot failed: {}", reason)
        }
        Ok(None) => {}
        Err(e) => tracing::error!("Failed to save pool state: {}", e),
    }
}
