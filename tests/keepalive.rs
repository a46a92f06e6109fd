//! Keep-alive scheduler integration tests.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use fleet_warden::config::{FleetConfig, KeepAliveConfig};
use fleet_warden::registry::ServiceRegistry;
use fleet_warden::scheduler::PingScheduler;

mod common;

fn fleet_of(entries: &[(&str, SocketAddr)]) -> FleetConfig {
    let services: BTreeMap<String, String> = entries
        .iter()
        .map(|(name, addr)| (name.to_string(), format!("http://{}", addr)))
        .collect();
    FleetConfig {
        services,
        cloud_deployment: false,
    }
}

fn scheduler_for(fleet: &FleetConfig, config: KeepAliveConfig) -> PingScheduler {
    let registry = Arc::new(ServiceRegistry::from_config("warden", fleet));
    PingScheduler::new("warden".to_string(), config, registry)
}

#[tokio::test]
async fn test_one_result_per_sibling_despite_failures() {
    let b1: SocketAddr = "127.0.0.1:28501".parse().unwrap();
    let b2: SocketAddr = "127.0.0.1:28502".parse().unwrap();
    // Nothing listens on the third address: connection refused.
    let dead: SocketAddr = "127.0.0.1:28503".parse().unwrap();

    common::start_mock_sibling(b1, "ok").await;
    common::start_mock_sibling(b2, "ok").await;

    let scheduler = scheduler_for(
        &fleet_of(&[("auth", b1), ("user", b2), ("jobs", dead)]),
        KeepAliveConfig {
            sibling_timeout_secs: 2,
            ..KeepAliveConfig::default()
        },
    );

    let results = scheduler.trigger_ping().await;

    assert_eq!(results.len(), 3, "exactly one result per registry entry");
    assert_eq!(results.iter().filter(|r| r.success).count(), 2);

    let failed = results.iter().find(|r| !r.success).unwrap();
    assert_eq!(failed.service, "jobs");
    assert!(failed.error.is_some());

    // Only successes make it into the history.
    let status = scheduler.status();
    assert_eq!(status.last_ping_times.len(), 2);
    assert!(status.last_ping_times.contains_key("auth"));
    assert!(status.last_ping_times.contains_key("user"));
    assert!(!status.last_ping_times.contains_key("jobs"));
}

#[tokio::test]
async fn test_cycle_wall_clock_is_slowest_timeout_not_sum() {
    let fast1: SocketAddr = "127.0.0.1:28511".parse().unwrap();
    let fast2: SocketAddr = "127.0.0.1:28512".parse().unwrap();
    let hung1: SocketAddr = "127.0.0.1:28513".parse().unwrap();
    let hung2: SocketAddr = "127.0.0.1:28514".parse().unwrap();
    let hung3: SocketAddr = "127.0.0.1:28515".parse().unwrap();

    common::start_mock_sibling(fast1, "ok").await;
    common::start_mock_sibling(fast2, "ok").await;
    for addr in [hung1, hung2, hung3] {
        common::start_programmable_sibling(addr, || async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            (200, "too late".to_string())
        })
        .await;
    }

    let scheduler = scheduler_for(
        &fleet_of(&[
            ("a", fast1),
            ("b", fast2),
            ("c", hung1),
            ("d", hung2),
            ("e", hung3),
        ]),
        KeepAliveConfig {
            sibling_timeout_secs: 2,
            ..KeepAliveConfig::default()
        },
    );

    let start = Instant::now();
    let results = scheduler.ping_all_services().await;
    let elapsed = start.elapsed();

    assert_eq!(results.len(), 5);
    assert_eq!(results.iter().filter(|r| r.success).count(), 2);

    // Three 2s timeouts in sequence would take ~6s; concurrently they
    // settle together just past the timeout.
    assert!(elapsed >= Duration::from_secs(2));
    assert!(
        elapsed < Duration::from_secs(5),
        "cycle took {:?}, pings are not concurrent",
        elapsed
    );

    for hung in ["c", "d", "e"] {
        let r = results.iter().find(|r| r.service == hung).unwrap();
        assert!(!r.success);
        assert!(r.error.as_deref().unwrap().contains("timed out"));
    }
}

#[tokio::test]
async fn test_stop_halts_future_cycles() {
    let addr: SocketAddr = "127.0.0.1:28521".parse().unwrap();

    let hits = Arc::new(AtomicU32::new(0));
    let counter = hits.clone();
    common::start_programmable_sibling(addr, move || {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            (200, "ok".to_string())
        }
    })
    .await;

    let scheduler = scheduler_for(
        &fleet_of(&[("auth", addr)]),
        KeepAliveConfig {
            interval_secs: 1,
            boot_delay_secs: 0,
            jitter_max_secs: 0,
            sibling_timeout_secs: 2,
            ..KeepAliveConfig::default()
        },
    );

    scheduler.start();
    tokio::time::sleep(Duration::from_millis(2500)).await;

    scheduler.stop();
    // Give an in-flight cycle time to drain before sampling the count.
    tokio::time::sleep(Duration::from_millis(500)).await;
    let at_stop = hits.load(Ordering::SeqCst);
    assert!(at_stop >= 2, "expected a few cycles before stop, got {}", at_stop);

    // Two full configured intervals after stopping: no further pings.
    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert_eq!(hits.load(Ordering::SeqCst), at_stop);
}

#[tokio::test]
async fn test_self_ping_updates_history() {
    let addr: SocketAddr = "127.0.0.1:28531".parse().unwrap();
    common::start_mock_sibling(addr, "ok").await;

    let scheduler = scheduler_for(
        &fleet_of(&[]),
        KeepAliveConfig {
            interval_secs: 1,
            boot_delay_secs: 0,
            jitter_max_secs: 0,
            self_url: Some(format!("http://{}", addr)),
            ..KeepAliveConfig::default()
        },
    );

    scheduler.start();
    tokio::time::sleep(Duration::from_millis(1200)).await;

    let status = scheduler.status();
    assert!(status.self_ping_active);
    assert!(
        status.last_ping_times.contains_key("warden"),
        "self ping should be recorded under the service's own name"
    );

    scheduler.stop();
    assert!(!scheduler.status().self_ping_active);
}
