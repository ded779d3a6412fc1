//! Prometheus exporter over HTTP.
//!
//! Serves the text exposition at `/metrics` and a JSON run summary at
//! `/health`. The registry is shared read-only; recording goes through
//! the same [`MetricsRegistry`] handle the caller keeps.

use super::MetricsRegistry;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tower_http::cors::CorsLayer;

/// Port used when none is configured.
pub const DEFAULT_EXPORTER_PORT: u16 = 9184;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("cannot bind exporter socket: {0}")]
    Bind(#[from] std::io::Error),

    #[error("exporter stopped: {0}")]
    Serve(String),
}

/// Where the exporter listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExporterConfig {
    pub bind_addr: SocketAddr,
}

impl ExporterConfig {
    /// Loopback only.
    pub fn local(port: u16) -> Self {
        Self {
            bind_addr: ([127, 0, 0, 1], port).into(),
        }
    }

    /// Every interface, for scraping from another host.
    pub fn public(port: u16) -> Self {
        Self {
            bind_addr: ([0, 0, 0, 0], port).into(),
        }
    }
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self::local(DEFAULT_EXPORTER_PORT)
    }
}

/// Body of `/health`.
#[derive(Debug, Serialize)]
struct HealthBody {
    status: &'static str,
    version: &'static str,
    simulations: u64,
    testbed_analyses: u64,
}

/// HTTP front for a [`MetricsRegistry`].
#[derive(Debug)]
pub struct MetricsExporter {
    config: ExporterConfig,
    registry: Arc<MetricsRegistry>,
}

impl MetricsExporter {
    pub fn new(config: ExporterConfig, registry: Arc<MetricsRegistry>) -> Self {
        Self { config, registry }
    }

    fn router(&self) -> Router {
        Router::new()
            .route("/metrics", get(exposition))
            .route("/health", get(health))
            .layer(CorsLayer::permissive())
            .with_state(Arc::clone(&self.registry))
    }

    /// Serves until `shutdown` resolves.
    pub async fn serve<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(addr = %self.config.bind_addr, "Metrics exporter listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ServerError::Serve(e.to_string()))?;

        tracing::info!("Metrics exporter stopped");
        Ok(())
    }
}

async fn exposition(State(registry): State<Arc<MetricsRegistry>>) -> Response {
    match registry.encode() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Metric encoding failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn health(State(registry): State<Arc<MetricsRegistry>>) -> Json<HealthBody> {
    Json(HealthBody {
        status: "healthy",
        version: crate::VERSION,
        simulations: registry.simulations_recorded(),
        testbed_analyses: registry.testbed_analyses_recorded(),
    })
}
