//! Configuration resolution from environment variables.
//!
//! # Responsibilities
//! - Resolve every setting from its environment variable, with defaults
//! - Resolve the sibling fleet from `FLEET_SERVICES` + per-service URLs
//! - Detect cloud deployments from platform-provided flags
//!
//! # Design Decisions
//! - Resolution never fails: a malformed value logs a warning and falls
//!   back to the default (the registry shrinking beats the process dying)
//! - Parsing helpers are pure functions over `Option<String>` so they can
//!   be tested without touching the process environment

use std::collections::BTreeMap;
use std::env;

use crate::config::schema::{
    FleetConfig, HealthConfig, KeepAliveConfig, ObservabilityConfig, ServerConfig, WardenConfig,
};

/// Environment flags that identify a cloud host. On these platforms a
/// loopback URL points inside the warden's own container and can never
/// reach a sibling.
const CLOUD_FLAGS: &[&str] = &["RENDER", "FLY_APP_NAME", "K_SERVICE"];

/// Resolve the full warden configuration from the process environment.
pub fn from_env() -> WardenConfig {
    let service_name = string_or(env_var("SERVICE_NAME"), "fleet-warden");

    WardenConfig {
        server: ServerConfig {
            bind_address: string_or(env_var("BIND_ADDRESS"), "0.0.0.0:8080"),
            request_timeout_secs: u64_or(env_var("REQUEST_TIMEOUT_SECS"), "REQUEST_TIMEOUT_SECS", 60),
        },
        keep_alive: KeepAliveConfig {
            enabled: bool_or(env_var("KEEPALIVE_ENABLED"), true),
            autostart: bool_or(env_var("KEEPALIVE_AUTOSTART"), true),
            interval_secs: u64_or(env_var("KEEPALIVE_INTERVAL_SECS"), "KEEPALIVE_INTERVAL_SECS", 600),
            self_url: env_var("SELF_URL"),
            trigger_token: env_var("KEEPALIVE_TRIGGER_TOKEN"),
            ..KeepAliveConfig::default()
        },
        fleet: FleetConfig {
            services: resolve_fleet(&service_name),
            cloud_deployment: detect_cloud(),
        },
        health: HealthConfig {
            environment: string_or(env_var("APP_ENV"), "development"),
            version: env_var("APP_VERSION"),
            required_services: list_or(env_var("REQUIRED_SERVICES")),
            ..HealthConfig::default()
        },
        observability: ObservabilityConfig {
            log_level: string_or(env_var("LOG_LEVEL"), "info"),
            metrics_enabled: bool_or(env_var("METRICS_ENABLED"), true),
            metrics_address: string_or(env_var("METRICS_ADDRESS"), "0.0.0.0:9090"),
        },
        service_name,
    }
}

/// Resolve the sibling fleet: `FLEET_SERVICES` names the members, and each
/// member's base URL comes from its own `<NAME>_SERVICE_URL` variable.
/// Members with no configured URL are simply omitted.
fn resolve_fleet(self_name: &str) -> BTreeMap<String, String> {
    let mut services = BTreeMap::new();

    for name in list_or(env_var("FLEET_SERVICES")) {
        let var = service_url_var(&name);
        match env_var(&var) {
            Some(u) => {
                services.insert(name, u);
            }
            None => {
                if name != self_name {
                    tracing::warn!(service = %name, var = %var, "No URL configured for fleet service, omitting");
                }
            }
        }
    }

    services
}

/// Derive the URL variable name for a fleet service,
/// e.g. `user-service` → `USER_SERVICE_URL`.
pub(crate) fn service_url_var(name: &str) -> String {
    let upper = name.to_uppercase().replace('-', "_");
    if upper.ends_with("_SERVICE") {
        format!("{}_URL", upper)
    } else {
        format!("{}_SERVICE_URL", upper)
    }
}

/// True when any cloud platform flag is set, or when forced explicitly
/// via `CLOUD_DEPLOYMENT=true`.
fn detect_cloud() -> bool {
    if bool_or(env_var("CLOUD_DEPLOYMENT"), false) {
        return true;
    }
    CLOUD_FLAGS.iter().any(|flag| env::var_os(flag).is_some())
}

fn env_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn string_or(value: Option<String>, default: &str) -> String {
    value.unwrap_or_else(|| default.to_string())
}

/// Accepts "true"/"1"/"yes" (any case) as true, "false"/"0"/"no" as false.
/// Anything else falls back to the default.
pub(crate) fn bool_or(value: Option<String>, default: bool) -> bool {
    match value.as_deref().map(|v| v.trim().to_ascii_lowercase()) {
        Some(v) if v == "true" || v == "1" || v == "yes" => true,
        Some(v) if v == "false" || v == "0" || v == "no" => false,
        _ => default,
    }
}

pub(crate) fn u64_or(value: Option<String>, key: &str, default: u64) -> u64 {
    match value.as_deref().map(|v| v.trim().parse::<u64>()) {
        Some(Ok(n)) => n,
        Some(Err(_)) => {
            tracing::warn!(var = %key, "Unparseable integer value, using default {}", default);
            default
        }
        None => default,
    }
}

/// Parse a comma-separated list, trimming entries and dropping empties.
pub(crate) fn list_or(value: Option<String>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}
