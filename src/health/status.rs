//! Check status and result types.
//!
//! Every check source (dependency probe, external service, custom check)
//! produces the same tagged `CheckResult`. The aggregator branches only on
//! `status`; the `detail` map is opaque payload for humans and dashboards.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Status of a single check.
///
/// Severity ordering: `Healthy < Degraded < Unhealthy = Error`. Unhealthy
/// and Error are equally bad for aggregation; Error just marks "the check
/// itself blew up" rather than "the dependency answered and is down".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Healthy,
    Degraded,
    Unhealthy,
    Error,
}

impl CheckStatus {
    /// Numeric severity for worst-of aggregation.
    pub fn severity(self) -> u8 {
        match self {
            CheckStatus::Healthy => 0,
            CheckStatus::Degraded => 1,
            CheckStatus::Unhealthy | CheckStatus::Error => 2,
        }
    }

    pub fn is_healthy(self) -> bool {
        matches!(self, CheckStatus::Healthy)
    }
}

/// Uniform result of one check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub status: CheckStatus,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub detail: Map<String, Value>,
}

impl CheckResult {
    pub fn healthy() -> Self {
        Self {
            status: CheckStatus::Healthy,
            detail: Map::new(),
        }
    }

    pub fn degraded(message: impl Into<String>) -> Self {
        Self::with_message(CheckStatus::Degraded, message)
    }

    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self::with_message(CheckStatus::Unhealthy, message)
    }

    /// The check itself failed to run (panic, thrown error).
    pub fn error(message: impl Into<String>) -> Self {
        Self::with_message(CheckStatus::Error, message)
    }

    /// Attach a detail field, builder style.
    pub fn with_detail(mut self, key: &str, value: Value) -> Self {
        self.detail.insert(key.to_string(), value);
        self
    }

    fn with_message(status: CheckStatus, message: impl Into<String>) -> Self {
        let mut detail = Map::new();
        detail.insert("message".to_string(), Value::String(message.into()));
        Self { status, detail }
    }
}

/// Worst status among the given checks; an empty set is `Healthy`.
pub fn overall_status<'a>(checks: impl IntoIterator<Item = &'a CheckResult>) -> CheckStatus {
    let mut overall = CheckStatus::Healthy;
    for check in checks {
        if check.status.severity() > overall.severity() {
            overall = check.status;
        }
    }
    overall
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_checks_are_healthy() {
        let none: Vec<CheckResult> = Vec::new();
        assert_eq!(overall_status(&none), CheckStatus::Healthy);
    }

    #[test]
    fn test_worst_status_wins() {
        let checks = [CheckResult::healthy(), CheckResult::degraded("slow")];
        assert_eq!(overall_status(&checks), CheckStatus::Degraded);

        let checks = [
            CheckResult::healthy(),
            CheckResult::degraded("slow"),
            CheckResult::unhealthy("down"),
        ];
        assert_eq!(overall_status(&checks), CheckStatus::Unhealthy);
    }

    #[test]
    fn test_single_error_flips_overall() {
        let mut checks = vec![CheckResult::healthy(); 10];
        checks.push(CheckResult::error("boom"));
        assert_eq!(overall_status(&checks), CheckStatus::Error);
    }

    #[test]
    fn test_unhealthy_and_error_rank_equal() {
        assert_eq!(
            CheckStatus::Unhealthy.severity(),
            CheckStatus::Error.severity()
        );
        // First worst encountered is kept; Error does not outrank Unhealthy.
        let checks = [CheckResult::unhealthy("down"), CheckResult::error("boom")];
        assert_eq!(overall_status(&checks).severity(), 2);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&CheckStatus::Healthy).unwrap(),
            "\"healthy\""
        );
        assert_eq!(
            serde_json::to_string(&CheckStatus::Error).unwrap(),
            "\"error\""
        );
    }
}
