//! Pluggable check sources.
//!
//! # Responsibilities
//! - Define the shape of externally supplied checks (dependency probe,
//!   custom checks) and of external-service probes
//! - Guard check execution: a panicking or misbehaving check becomes an
//!   `Error` result, never a crashed endpoint
//!
//! # Design Decisions
//! - Checks are plain async closures, not a trait object hierarchy; the
//!   warden core stays ignorant of what a check actually talks to

use futures_util::FutureExt;
use serde_json::Value;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;
use url::Url;

use crate::health::status::CheckResult;
use crate::probe::PingResult;

pub type CheckFuture = Pin<Box<dyn Future<Output = CheckResult> + Send>>;
type CheckFn = Arc<dyn Fn() -> CheckFuture + Send + Sync>;

/// A named check supplied by the embedding service: the primary datastore
/// probe, a cache probe, a disk-space check.
#[derive(Clone)]
pub struct Check {
    pub name: String,
    run: CheckFn,
}

impl Check {
    pub fn new<F, Fut>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CheckResult> + Send + 'static,
    {
        Self {
            name: name.into(),
            run: Arc::new(move || Box::pin(f())),
        }
    }

    /// Run the check, converting a panic into an `Error` result.
    pub async fn run_guarded(&self) -> CheckResult {
        match AssertUnwindSafe((self.run)()).catch_unwind().await {
            Ok(result) => result,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::error!(check = %self.name, error = %message, "Check panicked");
                CheckResult::error(message)
            }
        }
    }
}

impl std::fmt::Debug for Check {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Check").field("name", &self.name).finish()
    }
}

/// An external service probed over HTTP as part of a health report.
#[derive(Debug, Clone)]
pub struct ExternalService {
    pub name: String,
    pub url: Url,
}

/// Fold a probe outcome into the uniform check shape.
pub fn check_from_ping(ping: &PingResult) -> CheckResult {
    let base = if ping.success {
        CheckResult::healthy()
    } else {
        CheckResult::unhealthy(ping.error.clone().unwrap_or_else(|| "unreachable".to_string()))
    };

    let with_duration = base.with_detail("duration_ms", Value::from(ping.duration_ms));
    match ping.status_code {
        Some(code) => with_duration.with_detail("status_code", Value::from(code)),
        None => with_duration,
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "check panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::status::CheckStatus;

    #[tokio::test]
    async fn test_well_behaved_check_passes_through() {
        let check = Check::new("ok", || async { CheckResult::healthy() });
        assert_eq!(check.run_guarded().await.status, CheckStatus::Healthy);
    }

    #[tokio::test]
    async fn test_panicking_check_becomes_error_result() {
        let check = Check::new("bomb", || async { panic!("connection pool poisoned") });
        let result = check.run_guarded().await;

        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(
            result.detail.get("message").and_then(|v| v.as_str()),
            Some("connection pool poisoned")
        );
    }

    #[test]
    fn test_ping_conversion_keeps_status_code() {
        use chrono::Utc;

        let ping = PingResult {
            service: "auth".to_string(),
            success: false,
            status_code: Some(503),
            error: Some("HTTP 503 Service Unavailable".to_string()),
            duration_ms: 12,
            observed_at: Utc::now(),
        };

        let check = check_from_ping(&ping);
        assert_eq!(check.status, CheckStatus::Unhealthy);
        assert_eq!(
            check.detail.get("status_code").and_then(|v| v.as_u64()),
            Some(503)
        );
    }
}
