//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the warden.
//! All types derive Serde traits so a resolved configuration can be dumped
//! for inspection; resolution itself happens from environment variables in
//! `env.rs`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root configuration for the fleet warden.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct WardenConfig {
    /// Name of this service instance (excluded from the sibling registry).
    pub service_name: String,

    /// HTTP server settings.
    pub server: ServerConfig,

    /// Keep-alive scheduler settings.
    pub keep_alive: KeepAliveConfig,

    /// Sibling fleet settings.
    pub fleet: FleetConfig,

    /// Health report settings.
    pub health: HealthConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 60,
        }
    }
}

/// Keep-alive scheduler configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct KeepAliveConfig {
    /// Master enable flag for the scheduler.
    pub enabled: bool,

    /// Start the scheduler at process boot.
    pub autostart: bool,

    /// Ping interval in seconds. The self-ping timer additionally clamps
    /// this to stay under the host's idle-suspend window.
    pub interval_secs: u64,

    /// Delay before the first ping after `start()`, so the process can
    /// finish initializing before probing itself.
    pub boot_delay_secs: u64,

    /// Upper bound of the random stagger added to the first sibling cycle.
    pub jitter_max_secs: u64,

    /// Public URL of this instance for self-pings. None disables the
    /// self-ping timer.
    pub self_url: Option<String>,

    /// Timeout for self-pings in seconds.
    pub self_timeout_secs: u64,

    /// Timeout for sibling pings in seconds. Longer than the self-ping
    /// timeout: a suspended sibling has to cold-start before it can answer.
    pub sibling_timeout_secs: u64,

    /// Bearer token guarding the manual trigger endpoint. None leaves the
    /// trigger route unmounted.
    pub trigger_token: Option<String>,
}

impl Default for KeepAliveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            autostart: true,
            interval_secs: 600,
            boot_delay_secs: 30,
            jitter_max_secs: 45,
            self_url: None,
            self_timeout_secs: 10,
            sibling_timeout_secs: 25,
            trigger_token: None,
        }
    }
}

/// Sibling fleet configuration.
///
/// `services` maps sibling name to its configured base URL, exactly as
/// resolved from the environment. Siblings with no configured URL never
/// appear here; the registry applies the remaining filters (self
/// exclusion, loopback exclusion in cloud deployments, URL parsing).
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct FleetConfig {
    /// Sibling name → configured base URL.
    pub services: BTreeMap<String, String>,

    /// True when running on a cloud host where loopback URLs cannot reach
    /// other containers.
    pub cloud_deployment: bool,
}

/// Health report configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Environment label included in reports (development, production).
    pub environment: String,

    /// Version override for reports. None falls back to the crate version.
    pub version: Option<String>,

    /// External services whose health gates readiness, by name.
    pub required_services: Vec<String>,

    /// Timeout for dependency and external-service checks in seconds.
    pub check_timeout_secs: u64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            version: None,
            required_services: Vec::new(),
            check_timeout_secs: 5,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
