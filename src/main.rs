use daily_cards::clock::{Clock, SystemClock};
use daily_cards::config::StoreBackend;
use daily_cards::github::GitHubContentsStore;
use daily_cards::memory_store::MemoryStore;
use daily_cards::{AppState, Config, DocumentClient, DocumentStore, ProgressService, router};
use std::{net::SocketAddr, sync::Arc};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env()?;

    let backend: Arc<dyn DocumentStore> = match &config.backend {
        StoreBackend::GitHub(github) => {
            info!(repo = %github.repo, branch = %github.branch, "storing progress on github");
            Arc::new(GitHubContentsStore::new(github.clone(), config.store_timeout)?)
        }
        StoreBackend::Memory => {
            warn!("using the in-memory store, progress is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new(config.timezone));
    let policy = config.unlock_policy();
    let service = ProgressService::new(
        DocumentClient::new(backend),
        clock.clone(),
        config.total_days,
    );
    let state = AppState::new(service, policy, clock);

    info!(
        start = %config.start_date,
        total_days = config.total_days,
        mode = ?config.unlock_mode,
        tz = %config.timezone,
        "unlock policy"
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
