//! Routing HTTP Server - axum 0.7 Request Layer
//!
//! Exposes the routing API plus liveness, readiness and Prometheus
//! endpoints on one listener:
//!
//! - `GET  /`                      welcome message
//! - `GET  /status`                static service status
//! - `GET  /chain_metrics/:chain`  live metrics for one chain
//! - `POST /route`                 chain recommendation
//! - `GET  /live`, `GET /ready`    probes
//! - `GET  /metrics`               Prometheus text format

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tokio::net::TcpListener;
use tracing::{info, instrument, warn};

use super::dto::{ChainMetricsResponse, ErrorBody, RouteResponse};
use crate::adapters::metrics::RoutingMetrics;
use crate::domain::error::{CollectionFailure, RoutingError};
use crate::domain::routing::RoutingRequest;
use crate::usecases::router::RoutingService;

/// Shared state for every handler.
#[derive(Clone)]
pub struct AppState {
    /// Routing pipeline.
    pub service: Arc<RoutingService>,
    /// Prometheus sink; `/metrics` is 404 when absent.
    pub metrics: Option<Arc<RoutingMetrics>>,
    /// Cleared when shutdown begins.
    pub accepting: Arc<AtomicBool>,
}

impl AppState {
    pub fn new(service: Arc<RoutingService>, metrics: Option<Arc<RoutingMetrics>>) -> Self {
        Self {
            service,
            metrics,
            accepting: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Ready when not shutting down and at least one chain is connected.
    pub fn is_ready(&self) -> bool {
        self.accepting.load(Ordering::Relaxed) && self.service.connected_chains() > 0
    }
}

/// `RoutingError` mapped onto an HTTP status and JSON body.
pub struct ApiError(pub RoutingError);

impl From<RoutingError> for ApiError {
    fn from(e: RoutingError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            RoutingError::InvalidPreference(_) | RoutingError::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            RoutingError::UnsupportedChain(_) => StatusCode::NOT_FOUND,
            RoutingError::NoViableChains
            | RoutingError::NoComparableChains
            | RoutingError::Collection(CollectionFailure::EndpointUnavailable { .. }) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            RoutingError::Collection(CollectionFailure::MetricFetchError { .. }) => {
                StatusCode::BAD_GATEWAY
            }
            RoutingError::InvalidRegistry(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = ErrorBody {
            error: self.0.code(),
            detail: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Build the router. Exposed for tests.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/status", get(status))
        .route("/chain_metrics/:chain", get(chain_metrics))
        .route("/route", post(route))
        .route("/live", get(liveness))
        .route("/ready", get(readiness))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// axum-based HTTP server for the routing API.
pub struct HttpServer {
    /// Handler state.
    state: AppState,
    /// Bind address, e.g. "0.0.0.0:8000".
    bind_address: String,
}

impl HttpServer {
    pub fn new(state: AppState, bind_address: impl Into<String>) -> Self {
        Self {
            state,
            bind_address: bind_address.into(),
        }
    }

    /// Bind the configured address. Called before the server task is
    /// spawned so an occupied port fails startup.
    #[instrument(skip(self), fields(address = %self.bind_address))]
    pub async fn bind(&self) -> anyhow::Result<TcpListener> {
        TcpListener::bind(&self.bind_address)
            .await
            .with_context(|| format!("Failed to bind {}", self.bind_address))
    }

    /// Serve on an already-bound listener.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let accepting = Arc::clone(&self.state.accepting);
        let app = router(self.state);

        info!(address = %listener.local_addr()?, "Routing API listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.await;
                accepting.store(false, Ordering::Relaxed);
            })
            .await?;

        Ok(())
    }
}

async fn root() -> impl IntoResponse {
    Json(json!({
        "message": "Welcome to Nexus! Your intelligent cross-chain router is running."
    }))
}

async fn status() -> impl IntoResponse {
    Json(json!({
        "status": "operational",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn chain_metrics(
    State(state): State<AppState>,
    Path(chain): Path<String>,
) -> Result<Json<ChainMetricsResponse>, ApiError> {
    let metric = state.service.chain_metric(&chain).await?;
    Ok(Json(ChainMetricsResponse::from(&metric)))
}

async fn route(
    State(state): State<AppState>,
    payload: Result<Json<RoutingRequest>, JsonRejection>,
) -> Result<Json<RouteResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!(status = %rejection.status(), "Rejected route body");
        ApiError(RoutingError::InvalidRequest(rejection.body_text()))
    })?;

    match state.service.route(&request).await {
        Ok(decision) => Ok(Json(RouteResponse::new(request, decision))),
        Err(e) => {
            warn!(error = %e, code = e.code(), "Route request failed");
            Err(e.into())
        }
    }
}

async fn liveness() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    if state.is_ready() {
        (StatusCode::OK, "READY")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "NOT READY")
    }
}

async fn metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(m) => (StatusCode::OK, m.render()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
