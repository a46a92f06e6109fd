//! Sibling service registry.
//!
//! # Responsibilities
//! - Build the set of reachable siblings from the resolved fleet config
//! - Exclude this instance itself
//! - Exclude loopback URLs on cloud hosts (they point inside our own
//!   container and can never reach a sibling)
//!
//! # Design Decisions
//! - Fail-soft: a malformed URL is logged and omitted, never fatal. A
//!   silently smaller fleet beats a crash at boot.
//! - Descriptors are immutable after construction; everything downstream
//!   gets read-only access through an Arc.

use std::collections::BTreeMap;
use url::Url;

use crate::config::FleetConfig;

/// A single sibling service known to the warden.
#[derive(Debug, Clone)]
pub struct ServiceDescriptor {
    /// Sibling name as configured.
    pub name: String,
    /// Parsed base URL.
    pub base_url: Url,
    /// True when this descriptor refers to the running instance.
    pub is_self: bool,
}

/// Immutable registry of reachable siblings.
#[derive(Debug, Default)]
pub struct ServiceRegistry {
    services: BTreeMap<String, ServiceDescriptor>,
}

impl ServiceRegistry {
    /// Build the registry from the resolved fleet configuration.
    pub fn from_config(self_name: &str, fleet: &FleetConfig) -> Self {
        let mut services = BTreeMap::new();

        for (name, raw_url) in &fleet.services {
            if name == self_name {
                continue;
            }

            let base_url = match Url::parse(raw_url) {
                Ok(u) => u,
                Err(e) => {
                    tracing::warn!(service = %name, url = %raw_url, error = %e, "Malformed sibling URL, omitting");
                    continue;
                }
            };

            if fleet.cloud_deployment && is_loopback_url(&base_url) {
                tracing::debug!(service = %name, url = %base_url, "Loopback sibling unreachable from cloud host, omitting");
                continue;
            }

            services.insert(
                name.clone(),
                ServiceDescriptor {
                    name: name.clone(),
                    base_url,
                    is_self: false,
                },
            );
        }

        tracing::info!(count = services.len(), "Sibling registry built");
        Self { services }
    }

    /// Iterate descriptors in stable (name) order.
    pub fn iter(&self) -> impl Iterator<Item = &ServiceDescriptor> {
        self.services.values()
    }

    /// Sibling names in stable order.
    pub fn names(&self) -> Vec<String> {
        self.services.keys().cloned().collect()
    }

    /// Look up a sibling by name.
    pub fn get(&self, name: &str) -> Option<&ServiceDescriptor> {
        self.services.get(name)
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

/// True when the URL host is a loopback address (localhost, 127.0.0.0/8, ::1).
fn is_loopback_url(url: &Url) -> bool {
    match url.host() {
        Some(url::Host::Domain(d)) => d.eq_ignore_ascii_case("localhost"),
        Some(url::Host::Ipv4(ip)) => ip.is_loopback(),
        Some(url::Host::Ipv6(ip)) => ip.is_loopback(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fleet(entries: &[(&str, &str)], cloud: bool) -> FleetConfig {
        FleetConfig {
            services: entries
                .iter()
                .map(|(n, u)| (n.to_string(), u.to_string()))
                .collect(),
            cloud_deployment: cloud,
        }
    }

    #[test]
    fn test_excludes_self() {
        let registry = ServiceRegistry::from_config(
            "review",
            &fleet(
                &[
                    ("auth", "https://auth.example.com"),
                    ("review", "https://review.example.com"),
                ],
                false,
            ),
        );

        assert_eq!(registry.names(), vec!["auth".to_string()]);
        assert!(registry.get("review").is_none());
    }

    #[test]
    fn test_cloud_mode_excludes_loopback() {
        let entries = [
            ("auth", "https://auth.example.com"),
            ("user", "http://localhost:5002"),
            ("job", "http://127.0.0.1:5003"),
            ("pay", "http://[::1]:5004"),
        ];

        let cloud = ServiceRegistry::from_config("gw", &fleet(&entries, true));
        assert_eq!(cloud.names(), vec!["auth".to_string()]);

        // Same fleet on a local host keeps everything.
        let local = ServiceRegistry::from_config("gw", &fleet(&entries, false));
        assert_eq!(local.len(), 4);
    }

    #[test]
    fn test_malformed_url_is_omitted_not_fatal() {
        let registry = ServiceRegistry::from_config(
            "gw",
            &fleet(
                &[
                    ("auth", "https://auth.example.com"),
                    ("broken", "not a url at all"),
                ],
                false,
            ),
        );

        assert_eq!(registry.names(), vec!["auth".to_string()]);
    }

    #[test]
    fn test_names_are_stable_order() {
        let registry = ServiceRegistry::from_config(
            "gw",
            &fleet(
                &[
                    ("zeta", "https://z.example.com"),
                    ("alpha", "https://a.example.com"),
                    ("mid", "https://m.example.com"),
                ],
                false,
            ),
        );

        assert_eq!(
            registry.names(),
            vec!["alpha".to_string(), "mid".to_string(), "zeta".to_string()]
        );
    }
}
