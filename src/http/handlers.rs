//! HTTP handlers for the health and keep-alive endpoints.
//!
//! Thin bindings only: every handler calls into the aggregator or the
//! scheduler and maps the resulting report onto a status code. Dependency
//! failures are already data inside the reports, so the only way one of
//! these returns a framework-level 5xx is a bug in the warden itself.

use axum::{
    extract::{Query, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::http::server::AppState;
use crate::observability::metrics;

#[derive(Debug, Deserialize)]
pub struct HealthParams {
    /// `?detailed=true` attaches the host snapshot.
    #[serde(default)]
    pub detailed: bool,
}

/// `GET /` — service banner.
pub async fn banner(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "service": state.config.service_name,
        "message": "Fleet keep-warm and health reporting",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "GET /health": "Full health report (?detailed=true for host diagnostics)",
            "GET /health/ready": "Readiness: dependencies required to serve traffic",
            "GET /health/live": "Liveness: process is scheduling work",
            "GET /health/keepalive": "Keep-alive scheduler status",
            "POST /health/keepalive/trigger": "Run one sibling ping cycle now",
        },
    }))
}

/// `GET /health` — full health report; 200 when healthy, 503 otherwise.
pub async fn health(
    State(state): State<AppState>,
    Query(params): Query<HealthParams>,
) -> Response {
    let report = state.aggregator.health_report(params.detailed).await;
    let status = if report.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    metrics::record_health_request("health", status.as_u16());
    (status, Json(report)).into_response()
}

/// `GET /health/ready` — readiness report; 200 when ready, 503 otherwise.
pub async fn readiness(State(state): State<AppState>) -> Response {
    let report = state.aggregator.readiness_report().await;
    let status = if report.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    metrics::record_health_request("ready", status.as_u16());
    (status, Json(report)).into_response()
}

/// `GET /health/live` — always 200 while the process is scheduling code.
pub async fn liveness(State(state): State<AppState>) -> Response {
    let report = state.aggregator.liveness_report();
    metrics::record_health_request("live", StatusCode::OK.as_u16());
    (StatusCode::OK, Json(report)).into_response()
}

/// `GET /health/keepalive` — scheduler status snapshot.
pub async fn keepalive_status(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "data": state.scheduler.status(),
    }))
}

/// `POST /health/keepalive/trigger` — run one sibling cycle on demand.
///
/// Only mounted when a trigger token is configured; `trigger_auth` has
/// already vetted the caller by the time this runs.
pub async fn trigger(State(state): State<AppState>) -> Json<serde_json::Value> {
    let results = state.scheduler.trigger_ping().await;
    Json(json!({
        "success": true,
        "message": "Keep-alive triggered",
        "data": results,
    }))
}

/// Bearer-token gate for the manual trigger endpoint.
pub async fn trigger_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let expected = state
        .config
        .keep_alive
        .trigger_token
        .as_deref()
        .ok_or(StatusCode::NOT_FOUND)?;

    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    match auth_header {
        Some(value) if value == format!("Bearer {}", expected) => Ok(next.run(request).await),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}
