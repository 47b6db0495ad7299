//! Tracing and metrics setup for the leaderboard service.
//!
//! Configures a tracing subscriber with environment filtering, installs a
//! Prometheus metrics recorder, and serves `/metrics`, `/live`, and `/ready`
//! over a small axum router. The recorder handle is cached so repeated
//! initialization (test binaries) reuses the first install.
use anyhow::{Context, Result};
use axum::Router;
use axum::routing::get;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize tracing and the Prometheus recorder.
///
/// Returns a handle for rendering the metrics exposition text.
pub fn init_observability(service_name: &str) -> Result<PrometheusHandle> {
    // Default to "info" when RUST_LOG is unset or invalid.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A second subscriber install is fine; keep the first one.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    if let Some(handle) = METRICS_HANDLE.get() {
        return Ok(handle.clone());
    }
    let handle = match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => METRICS_HANDLE.get_or_init(|| handle).clone(),
        // Lost an install race; reuse the winner's recorder.
        Err(err) => match METRICS_HANDLE.get() {
            Some(handle) => handle.clone(),
            None => return Err(err).context("install prometheus recorder"),
        },
    };
    tracing::info!(service = service_name, "observability initialized");
    Ok(handle)
}

/// Serve the metrics endpoints until the listener fails.
pub async fn serve_metrics(handle: PrometheusHandle, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("bind metrics listener")?;
    tracing::info!(addr = %listener.local_addr()?, "metrics listener started");
    axum::serve(listener, metrics_router(handle))
        .await
        .context("serve metrics")
}

fn metrics_router(handle: PrometheusHandle) -> Router {
    Router::new()
        .route(
            "/metrics",
            get(move || {
                let handle = handle.clone();
                async move { handle.render() }
            }),
        )
        .route("/live", get(|| async { "ok" }))
        .route("/ready", get(|| async { "ok" }))
}
