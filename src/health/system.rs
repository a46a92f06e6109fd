//! Host diagnostics for detailed health reports.

use serde::Serialize;
use sysinfo::System;

/// Point-in-time host snapshot attached to `/health?detailed=true`.
///
/// Diagnostic only: never feeds into the overall status.
#[derive(Debug, Clone, Serialize)]
pub struct SystemSnapshot {
    pub memory_used_mb: u64,
    pub memory_total_mb: u64,
    pub load_average_one: f64,
    pub load_average_five: f64,
    pub load_average_fifteen: f64,
    pub host_uptime_seconds: u64,
}

impl SystemSnapshot {
    pub fn collect() -> Self {
        let mut system = System::new();
        system.refresh_memory();

        let load = System::load_average();

        Self {
            memory_used_mb: system.used_memory() / 1024 / 1024,
            memory_total_mb: system.total_memory() / 1024 / 1024,
            load_average_one: load.one,
            load_average_five: load.five,
            load_average_fifteen: load.fifteen,
            host_uptime_seconds: System::uptime(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_is_sane() {
        let snapshot = SystemSnapshot::collect();
        assert!(snapshot.memory_total_mb > 0);
        assert!(snapshot.memory_used_mb <= snapshot.memory_total_mb);
    }
}
