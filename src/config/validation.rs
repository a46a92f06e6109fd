//! Configuration validation.
//!
//! Semantic checks on a resolved configuration. Unlike a proxy where a bad
//! config must refuse to boot, the warden is deliberately fail-soft: every
//! finding here is a warning to log, never a reason to exit. A fleet that
//! shrank to nothing still serves its own health endpoints.

use std::fmt;

use crate::config::schema::WardenConfig;

/// A non-fatal configuration finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationWarning {
    /// Keep-alive is enabled but there is nothing to ping.
    EmptyFleet,
    /// Keep-alive is enabled but no self URL is configured.
    NoSelfUrl,
    /// The ping interval is zero; the scheduler will fall back to its default.
    ZeroInterval,
    /// Production deployment with an unauthenticated trigger endpoint.
    TriggerUnprotected,
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationWarning::EmptyFleet => {
                write!(f, "keep-alive enabled but no sibling services are configured")
            }
            ValidationWarning::NoSelfUrl => {
                write!(f, "keep-alive enabled but SELF_URL is not set; self-pings disabled")
            }
            ValidationWarning::ZeroInterval => {
                write!(f, "KEEPALIVE_INTERVAL_SECS is 0; using the default interval")
            }
            ValidationWarning::TriggerUnprotected => {
                write!(f, "production deployment without KEEPALIVE_TRIGGER_TOKEN; trigger endpoint stays unmounted")
            }
        }
    }
}

/// Collect all warnings for a resolved configuration.
pub fn validate_config(config: &WardenConfig) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if config.keep_alive.enabled {
        if config.fleet.services.is_empty() {
            warnings.push(ValidationWarning::EmptyFleet);
        }
        if config.keep_alive.self_url.is_none() {
            warnings.push(ValidationWarning::NoSelfUrl);
        }
        if config.keep_alive.interval_secs == 0 {
            warnings.push(ValidationWarning::ZeroInterval);
        }
    }

    if config.health.environment == "production" && config.keep_alive.trigger_token.is_none() {
        warnings.push(ValidationWarning::TriggerUnprotected);
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_warns_about_empty_fleet() {
        let config = WardenConfig::default();
        // Defaults: keep-alive on, no fleet, no self URL.
        let warnings = validate_config(&config);
        assert!(warnings.contains(&ValidationWarning::EmptyFleet));
        assert!(warnings.contains(&ValidationWarning::NoSelfUrl));
    }

    #[test]
    fn test_disabled_keepalive_suppresses_fleet_warnings() {
        let mut config = WardenConfig::default();
        config.keep_alive.enabled = false;
        assert!(validate_config(&config).is_empty());
    }

    #[test]
    fn test_production_without_trigger_token() {
        let mut config = WardenConfig::default();
        config.keep_alive.enabled = false;
        config.health.environment = "production".to_string();
        assert_eq!(
            validate_config(&config),
            vec![ValidationWarning::TriggerUnprotected]
        );
    }
}
