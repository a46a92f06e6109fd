//! Bounded-time HTTP probing.
//!
//! # Responsibilities
//! - Issue one health request against a base URL with an explicit timeout
//! - Fold every transport outcome into a uniform `PingResult`
//!
//! # Design Decisions
//! - A probe never returns an error to its caller: timeouts, connection
//!   failures and non-success statuses are data in the result, not faults
//! - One shared pooled client for all probes

use axum::body::Body;
use axum::http::Request;
use chrono::{DateTime, Utc};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use serde::Serialize;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::time;
use url::Url;

/// User agent sent with every probe.
const PROBE_USER_AGENT: &str = "fleet-warden-keepalive";

/// Probe failure classes. Resolved into `PingResult` data at the probe
/// boundary; callers never see these as errors.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// No response within the per-probe timeout.
    #[error("timed out after {0}s")]
    Timeout(u64),

    /// Connection-level failure (refused, reset, DNS).
    #[error("{0}")]
    Unreachable(String),

    /// The target answered with a non-success status.
    #[error("HTTP {0}")]
    Status(u16),

    /// The probe request itself could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ProbeError {
    fn status_code(&self) -> Option<u16> {
        match self {
            ProbeError::Status(code) => Some(*code),
            _ => None,
        }
    }
}

/// Outcome of a single probe attempt. Created fresh per attempt and never
/// persisted.
#[derive(Debug, Clone, Serialize)]
pub struct PingResult {
    /// Name of the probed service.
    pub service: String,
    /// True when the probe got a 2xx response within the timeout.
    pub success: bool,
    /// HTTP status code, when a response arrived at all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    /// Transport or status error, when the probe failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Wall-clock duration of the attempt in milliseconds.
    pub duration_ms: u64,
    /// When the attempt completed.
    pub observed_at: DateTime<Utc>,
}

/// HTTP prober shared by self-pings, sibling-pings and external-service
/// health checks.
#[derive(Clone)]
pub struct Prober {
    client: Client<HttpConnector, Body>,
}

impl Prober {
    pub fn new() -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self { client }
    }

    /// Probe `{base_url}/health`, bounded by `timeout`.
    pub async fn probe(&self, service: &str, base_url: &Url, timeout: Duration) -> PingResult {
        let uri = health_url(base_url);
        let start = Instant::now();

        let request = match Request::builder()
            .method("GET")
            .uri(&uri)
            .header("user-agent", PROBE_USER_AGENT)
            .body(Body::empty())
        {
            Ok(req) => req,
            Err(e) => {
                tracing::error!(service = %service, error = %e, "Failed to build probe request");
                let err = ProbeError::InvalidRequest(e.to_string());
                return PingResult::from_outcome(service, Err(err), start);
            }
        };

        let outcome = match time::timeout(timeout, self.client.request(request)).await {
            Ok(Ok(response)) => {
                let status = response.status();
                if status.is_success() {
                    Ok(status.as_u16())
                } else {
                    Err(ProbeError::Status(status.as_u16()))
                }
            }
            Ok(Err(e)) => Err(ProbeError::Unreachable(e.to_string())),
            Err(_) => Err(ProbeError::Timeout(timeout.as_secs())),
        };

        PingResult::from_outcome(service, outcome, start)
    }
}

impl Default for Prober {
    fn default() -> Self {
        Self::new()
    }
}

impl PingResult {
    fn from_outcome(service: &str, outcome: Result<u16, ProbeError>, start: Instant) -> Self {
        let (success, status_code, error) = match outcome {
            Ok(code) => (true, Some(code), None),
            Err(e) => (false, e.status_code(), Some(e.to_string())),
        };

        Self {
            service: service.to_string(),
            success,
            status_code,
            error,
            duration_ms: start.elapsed().as_millis() as u64,
            observed_at: Utc::now(),
        }
    }
}

/// Build the probe target for a base URL.
fn health_url(base_url: &Url) -> String {
    format!("{}/health", base_url.as_str().trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_url_handles_trailing_slash() {
        let with = Url::parse("http://svc.example.com:5001/").unwrap();
        let without = Url::parse("http://svc.example.com:5001").unwrap();
        assert_eq!(health_url(&with), "http://svc.example.com:5001/health");
        assert_eq!(health_url(&without), "http://svc.example.com:5001/health");
    }

    #[test]
    fn test_non_success_status_keeps_code_in_result() {
        let start = Instant::now();
        let result =
            PingResult::from_outcome("auth", Err(ProbeError::Status(503)), start);

        assert!(!result.success);
        assert_eq!(result.status_code, Some(503));
        assert_eq!(result.error.as_deref(), Some("HTTP 503"));
    }

    #[test]
    fn test_timeout_has_no_status_code() {
        let start = Instant::now();
        let result = PingResult::from_outcome("auth", Err(ProbeError::Timeout(25)), start);

        assert!(!result.success);
        assert!(result.status_code.is_none());
        assert_eq!(result.error.as_deref(), Some("timed out after 25s"));
    }

    #[tokio::test]
    async fn test_unreachable_target_becomes_failure_result() {
        let prober = Prober::new();
        // Nothing listens on this port.
        let url = Url::parse("http://127.0.0.1:1").unwrap();
        let result = prober.probe("ghost", &url, Duration::from_secs(2)).await;

        assert_eq!(result.service, "ghost");
        assert!(!result.success);
        assert!(result.status_code.is_none());
        assert!(result.error.is_some());
    }
}
