//! Health report aggregation.
//!
//! # Responsibilities
//! - Compose dependency, external-service and custom checks into one
//!   `HealthReport` / `ReadinessReport` / `LivenessReport`
//! - Keep every report computation framework-independent; the axum
//!   binding in `http::handlers` only maps reports to status codes
//!
//! # Design Decisions
//! - Reports are computed fresh per request, never cached
//! - External services are probed concurrently and combined only after
//!   all have settled, so one dead service cannot hide the others
//! - Liveness performs zero checks: if it depended on a downstream
//!   dependency, an outage there would get healthy processes restarted

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use url::Url;

use crate::config::HealthConfig;
use crate::health::checks::{check_from_ping, Check, ExternalService};
use crate::health::status::{overall_status, CheckResult, CheckStatus};
use crate::health::system::SystemSnapshot;
use crate::probe::Prober;

/// Full health report served by `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub service: String,
    pub status: CheckStatus,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub version: String,
    pub environment: String,
    pub pid: u32,
    pub checks: BTreeMap<String, CheckResult>,
    pub response_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<SystemSnapshot>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status.is_healthy()
    }
}

/// Readiness report served by `GET /health/ready`.
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessReport {
    pub ready: bool,
    pub checks: BTreeMap<String, CheckResult>,
}

/// Liveness report served by `GET /health/live`.
#[derive(Debug, Clone, Serialize)]
pub struct LivenessReport {
    pub alive: bool,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: u64,
}

/// Composes externally supplied checks into HTTP-facing reports.
#[derive(Clone)]
pub struct HealthAggregator {
    service_name: String,
    version: String,
    environment: String,
    started_at: Instant,
    dependency: Option<Check>,
    external_services: Vec<ExternalService>,
    custom_checks: Vec<Check>,
    required_services: Vec<String>,
    check_timeout: Duration,
    prober: Prober,
}

impl HealthAggregator {
    pub fn new(service_name: impl Into<String>, config: &HealthConfig) -> Self {
        Self {
            service_name: service_name.into(),
            version: config
                .version
                .clone()
                .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string()),
            environment: config.environment.clone(),
            started_at: Instant::now(),
            dependency: None,
            external_services: Vec::new(),
            custom_checks: Vec::new(),
            required_services: config.required_services.clone(),
            check_timeout: Duration::from_secs(config.check_timeout_secs),
            prober: Prober::new(),
        }
    }

    /// Plug in the primary dependency probe (e.g., the datastore).
    pub fn with_dependency_check(mut self, check: Check) -> Self {
        self.dependency = Some(check);
        self
    }

    /// Add an external service to probe during full health reports.
    pub fn with_external_service(mut self, name: impl Into<String>, url: Url) -> Self {
        self.external_services.push(ExternalService {
            name: name.into(),
            url,
        });
        self
    }

    /// Add a custom check, run on every full health report.
    pub fn with_custom_check(mut self, check: Check) -> Self {
        self.custom_checks.push(check);
        self
    }

    /// Compute the full health report.
    pub async fn health_report(&self, detailed: bool) -> HealthReport {
        let start = Instant::now();
        let mut checks = BTreeMap::new();

        // 1. Dependency probe, bounded by the check timeout.
        if let Some(dependency) = &self.dependency {
            checks.insert(dependency.name.clone(), self.run_bounded(dependency).await);
        }

        // 2. External services, probed concurrently, all-settled.
        for (name, result) in self.probe_external(&self.external_services).await {
            checks.insert(name, result);
        }

        // 3. Custom checks in sequence; a misbehaving one becomes an
        //    Error result instead of failing the handler.
        for check in &self.custom_checks {
            checks.insert(check.name.clone(), check.run_guarded().await);
        }

        // 4. Detailed requests get a host snapshot; diagnostic only.
        let system = if detailed {
            Some(SystemSnapshot::collect())
        } else {
            None
        };

        let status = overall_status(checks.values());

        HealthReport {
            service: self.service_name.clone(),
            status,
            timestamp: Utc::now(),
            uptime_seconds: self.uptime_seconds(),
            version: self.version.clone(),
            environment: self.environment.clone(),
            pid: std::process::id(),
            checks,
            response_time_ms: start.elapsed().as_millis() as u64,
            system,
        }
    }

    /// Compute the readiness report: the dependency check plus the
    /// required-services subset. Custom checks stay out on purpose; only
    /// checks that gate "can this instance serve traffic" belong here.
    pub async fn readiness_report(&self) -> ReadinessReport {
        let mut checks = BTreeMap::new();

        if let Some(dependency) = &self.dependency {
            checks.insert(dependency.name.clone(), self.run_bounded(dependency).await);
        }

        let required: Vec<ExternalService> = self
            .external_services
            .iter()
            .filter(|s| self.required_services.contains(&s.name))
            .cloned()
            .collect();
        for (name, result) in self.probe_external(&required).await {
            checks.insert(name, result);
        }

        let ready = checks.values().all(|c| c.status.is_healthy());
        ReadinessReport { ready, checks }
    }

    /// Compute the liveness report. Performs no checks of any kind.
    pub fn liveness_report(&self) -> LivenessReport {
        LivenessReport {
            alive: true,
            timestamp: Utc::now(),
            uptime_seconds: self.uptime_seconds(),
        }
    }

    async fn run_bounded(&self, check: &Check) -> CheckResult {
        match tokio::time::timeout(self.check_timeout, check.run_guarded()).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(check = %check.name, timeout_secs = self.check_timeout.as_secs(), "Check timed out");
                CheckResult::unhealthy(format!(
                    "timed out after {}s",
                    self.check_timeout.as_secs()
                ))
            }
        }
    }

    async fn probe_external(
        &self,
        services: &[ExternalService],
    ) -> Vec<(String, CheckResult)> {
        let probes = services.iter().map(|service| async {
            let ping = self
                .prober
                .probe(&service.name, &service.url, self.check_timeout)
                .await;
            (service.name.clone(), check_from_ping(&ping))
        });
        futures_util::future::join_all(probes).await
    }

    fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
