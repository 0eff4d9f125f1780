use std::net::SocketAddr;

use anyhow::Context;
use axum::{extract::State, http::StatusCode, routing::get, Router};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::pipeline::Scraper;

#[derive(Clone)]
struct AppState {
    scraper: Scraper,
    handle: PrometheusHandle,
}

pub fn install_recorder() -> anyhow::Result<PrometheusHandle> {
    PrometheusBuilder::new()
        .install_recorder()
        .context("failed to install Prometheus metrics recorder")
}

/// `GET /metrics` reads one frame from the meter, then renders every metric.
pub fn router(scraper: Scraper, handle: PrometheusHandle) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(AppState { scraper, handle })
}

pub async fn serve(bind_addr: &str, app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = bind_addr
        .parse()
        .with_context(|| format!("invalid metrics bind address {bind_addr}"))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind metrics listener on {addr}"))?;
    tracing::info!(%addr, "serving metrics");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("metrics server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

async fn metrics_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    let scraper = state.scraper.clone();

    // Scrape failures are already logged and counted; the render still goes out.
    if let Err(e) = tokio::task::spawn_blocking(move || scraper.scrape()).await {
        tracing::error!(error = %e, "scrape task failed");
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    Ok(state.handle.render())
}
