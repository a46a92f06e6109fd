//! Keep-alive ping scheduler.
//!
//! # Data Flow
//! ```text
//! start():
//!     self URL resolvable → self-ping timer (interval clamped under the
//!                           host idle-suspend window)
//!     registry non-empty  → sibling-ping timer (first cycle staggered by
//!                           boot delay + random jitter)
//!
//! Each cycle:
//!     probe every sibling concurrently → record outcomes → PingHistory
//!
//! stop():
//!     broadcast shutdown → timers exit; in-flight probes finish on their
//!     own clock (bounded by the per-probe timeout)
//! ```
//!
//! # Design Decisions
//! - State machine is Stopped → Running → Stopped, nothing else;
//!   `start()` is a no-op while running and `stop()` is idempotent
//! - A failed ping is logged and counted, never escalated; the next
//!   scheduled cycle is the implicit retry
//! - One unreachable sibling must never suppress results for the others

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rand::Rng;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time;
use url::Url;

use crate::config::KeepAliveConfig;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::probe::{PingResult, Prober};
use crate::registry::ServiceRegistry;

/// Fallback interval when the configured one is zero.
const DEFAULT_INTERVAL_SECS: u64 = 600;

/// Upper bound for the self-ping interval. Suspend-on-idle hosts reclaim
/// containers after ~15 minutes of silence; pinging ourselves at most
/// every 8 minutes keeps us safely under that window.
const SELF_PING_MAX_INTERVAL: Duration = Duration::from_secs(8 * 60);

/// Side-effect-free snapshot of the scheduler, served by the keep-alive
/// status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SchedulerStatus {
    pub enabled: bool,
    pub running: bool,
    pub self_ping_active: bool,
    pub sibling_names: Vec<String>,
    pub last_ping_times: BTreeMap<String, DateTime<Utc>>,
}

/// Periodic self/sibling ping scheduler.
///
/// Owns its history map; no process-wide state. Cheap to clone, all
/// mutable state lives behind Arcs shared by the clones.
#[derive(Clone)]
pub struct PingScheduler {
    service_name: String,
    config: KeepAliveConfig,
    registry: Arc<ServiceRegistry>,
    prober: Prober,
    /// Service name → last *successful* ping. Written only from the ping
    /// paths, read by the status snapshot.
    history: Arc<DashMap<String, DateTime<Utc>>>,
    running: Arc<AtomicBool>,
    self_ping_active: Arc<AtomicBool>,
    shutdown: Arc<Shutdown>,
}

impl PingScheduler {
    pub fn new(service_name: String, config: KeepAliveConfig, registry: Arc<ServiceRegistry>) -> Self {
        Self {
            service_name,
            config,
            registry,
            prober: Prober::new(),
            history: Arc::new(DashMap::new()),
            running: Arc::new(AtomicBool::new(false)),
            self_ping_active: Arc::new(AtomicBool::new(false)),
            shutdown: Arc::new(Shutdown::new()),
        }
    }

    /// Start both timers. No-op while already running or when the master
    /// flag is off.
    pub fn start(&self) {
        if !self.config.enabled {
            tracing::info!("Keep-alive disabled, scheduler not starting");
            return;
        }
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }

        if let Some(self_url) = self.resolve_self_url() {
            self.self_ping_active.store(true, Ordering::SeqCst);
            let worker = self.clone();
            let shutdown = self.shutdown.subscribe();
            tokio::spawn(async move {
                worker.self_ping_loop(self_url, shutdown).await;
            });
        }

        if !self.registry.is_empty() {
            let worker = self.clone();
            let shutdown = self.shutdown.subscribe();
            tokio::spawn(async move {
                worker.sibling_ping_loop(shutdown).await;
            });
        }

        tracing::info!(
            interval_secs = self.sibling_interval().as_secs(),
            self_ping = self.self_ping_active.load(Ordering::SeqCst),
            siblings = self.registry.len(),
            "Keep-alive scheduler started"
        );
    }

    /// Cancel future timer firings. Idempotent. Probes already in flight
    /// complete or time out on their own schedule.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        self.self_ping_active.store(false, Ordering::SeqCst);
        self.shutdown.trigger();
        tracing::info!("Keep-alive scheduler stopped");
    }

    /// Ping one service once. Transport errors are folded into the result;
    /// only a success updates the history.
    pub async fn ping_service(&self, name: &str, base_url: &Url) -> PingResult {
        let timeout = Duration::from_secs(self.config.sibling_timeout_secs);
        let result = self.prober.probe(name, base_url, timeout).await;
        self.record(&result);
        result
    }

    /// Ping every registry entry concurrently, waiting for all to settle.
    /// Always returns exactly one result per sibling.
    pub async fn ping_all_services(&self) -> Vec<PingResult> {
        let probes = self
            .registry
            .iter()
            .map(|d| self.ping_service(&d.name, &d.base_url));
        futures_util::future::join_all(probes).await
    }

    /// Run one sibling cycle on demand (operator trigger endpoint).
    pub async fn trigger_ping(&self) -> Vec<PingResult> {
        tracing::info!(siblings = self.registry.len(), "Manual keep-alive trigger");
        self.ping_all_services().await
    }

    /// Snapshot of the scheduler state. No side effects.
    pub fn status(&self) -> SchedulerStatus {
        SchedulerStatus {
            enabled: self.config.enabled,
            running: self.running.load(Ordering::SeqCst),
            self_ping_active: self.self_ping_active.load(Ordering::SeqCst),
            sibling_names: self.registry.names(),
            last_ping_times: self
                .history
                .iter()
                .map(|entry| (entry.key().clone(), *entry.value()))
                .collect(),
        }
    }

    async fn self_ping_loop(self, self_url: Url, mut shutdown: broadcast::Receiver<()>) {
        let boot_delay = Duration::from_secs(self.config.boot_delay_secs);
        tokio::select! {
            _ = time::sleep(boot_delay) => {}
            _ = shutdown.recv() => return,
        }

        let interval = effective_self_interval(self.config.interval_secs);
        tracing::info!(interval_secs = interval.as_secs(), url = %self_url, "Self-ping timer started");

        // The first tick completes immediately, firing the boot-delay ping.
        let mut ticker = time::interval(interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let timeout = Duration::from_secs(self.config.self_timeout_secs);
                    let result = self.prober.probe(&self.service_name, &self_url, timeout).await;
                    self.record(&result);
                }
                _ = shutdown.recv() => {
                    tracing::debug!("Self-ping timer exiting");
                    break;
                }
            }
        }
    }

    async fn sibling_ping_loop(self, mut shutdown: broadcast::Receiver<()>) {
        // Stagger the first cycle so a fleet restarting together does not
        // hammer itself in the same instant.
        let first_delay =
            Duration::from_secs(self.config.boot_delay_secs) + jitter(self.config.jitter_max_secs);
        tracing::info!(delay_secs = first_delay.as_secs(), "First sibling cycle scheduled");

        tokio::select! {
            _ = time::sleep(first_delay) => {}
            _ = shutdown.recv() => return,
        }

        let mut ticker = time::interval(self.sibling_interval());
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let results = self.ping_all_services().await;
                    let up = results.iter().filter(|r| r.success).count();
                    tracing::info!(up = up, total = results.len(), "Sibling ping cycle complete");
                }
                _ = shutdown.recv() => {
                    tracing::debug!("Sibling-ping timer exiting");
                    break;
                }
            }
        }
    }

    fn record(&self, result: &PingResult) {
        metrics::record_ping(&result.service, result.success, result.duration_ms);
        if result.success {
            self.history.insert(result.service.clone(), result.observed_at);
            tracing::debug!(
                service = %result.service,
                duration_ms = result.duration_ms,
                "Ping succeeded"
            );
        } else {
            tracing::warn!(
                service = %result.service,
                error = result.error.as_deref().unwrap_or("unknown"),
                "Ping failed"
            );
        }
    }

    fn sibling_interval(&self) -> Duration {
        if self.config.interval_secs == 0 {
            Duration::from_secs(DEFAULT_INTERVAL_SECS)
        } else {
            Duration::from_secs(self.config.interval_secs)
        }
    }

    fn resolve_self_url(&self) -> Option<Url> {
        let raw = self.config.self_url.as_deref()?;
        match Url::parse(raw) {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!(url = %raw, error = %e, "Malformed SELF_URL, self-pings disabled");
                None
            }
        }
    }
}

/// Clamp the configured interval for self-pings.
fn effective_self_interval(configured_secs: u64) -> Duration {
    let configured = if configured_secs == 0 {
        Duration::from_secs(DEFAULT_INTERVAL_SECS)
    } else {
        Duration::from_secs(configured_secs)
    };
    configured.min(SELF_PING_MAX_INTERVAL)
}

/// Random stagger in whole seconds, up to `max_secs` inclusive.
fn jitter(max_secs: u64) -> Duration {
    if max_secs == 0 {
        return Duration::ZERO;
    }
    Duration::from_secs(rand::thread_rng().gen_range(0..=max_secs))
}
