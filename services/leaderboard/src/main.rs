// Leaderboard service main entry point.
use anyhow::{Context, Result};
use crest_identity::{IdentityProvider, JwtIdentityProvider};
use crest_notify::{InProcessHub, Notifier, PushTransport};
use crest_registry::ConnectionRegistry;
use crest_registry::memory::MemoryConnectionRegistry;
use crest_store::ScoreStore;
use crest_store::memory::MemoryScoreStore;
use leaderboard::app::{AppState, build_router};
use leaderboard::config::LeaderboardConfig;
use leaderboard::observability;
use leaderboard::submission::ScoreSubmission;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    run_with_shutdown(async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

async fn run_with_shutdown<F>(shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let metrics_handle = observability::init_observability("crest-leaderboard")?;
    let config = Arc::new(LeaderboardConfig::from_env_or_yaml()?);

    // Expose Prometheus metrics on the configured bind address.
    tokio::spawn(observability::serve_metrics(
        metrics_handle,
        config.metrics_bind,
    ));

    let identity: Arc<dyn IdentityProvider> = Arc::new(JwtIdentityProvider::new(
        config.token_secret.as_bytes(),
        &config.token_issuer,
        &config.token_audience,
    ));
    let scores: Arc<dyn ScoreStore> = Arc::new(MemoryScoreStore::new());
    let registry: Arc<dyn ConnectionRegistry> = Arc::new(MemoryConnectionRegistry::new());
    // In-process transport; a deployment behind a push gateway swaps in its
    // own PushTransport here.
    let transport: Arc<dyn PushTransport> = Arc::new(InProcessHub::new());
    let notifier = Notifier::new(
        Arc::clone(&registry),
        transport,
        Duration::from_millis(config.push_timeout_ms),
    );
    let submission = Arc::new(ScoreSubmission::new(
        Arc::clone(&identity),
        Arc::clone(&scores),
        notifier,
        &config,
    ));

    let state = AppState {
        config: Arc::clone(&config),
        identity,
        scores,
        registry,
        submission,
    };

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .context("bind api listener")?;
    tracing::info!(addr = %listener.local_addr()?, "leaderboard api started");
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("serve api")?;
    tracing::info!("leaderboard stopped");
    Ok(())
}
