//! Fleet Warden daemon.
//!
//! Keep-warm and health reporting for a small, statically-configured
//! service fleet on suspend-on-idle hosting.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────┐
//!                    │                FLEET WARDEN                  │
//!                    │                                              │
//!   GET /health      │  ┌─────────┐   ┌────────────┐                │
//!   ─────────────────┼─▶│  http   │──▶│   health   │── checks ──▶   │
//!   /ready /live     │  │ server  │   │ aggregator │                │
//!                    │  └─────────┘   └────────────┘                │
//!                    │                                              │
//!                    │  ┌───────────┐   ┌────────┐   ┌───────────┐  │      siblings
//!                    │  │ scheduler │──▶│ prober │──▶│ GET       │──┼────▶ (and self)
//!                    │  │  timers   │   │        │   │ /health   │  │
//!                    │  └───────────┘   └────────┘   └───────────┘  │
//!                    │        ▲                                     │
//!                    │  ┌─────┴────┐  ┌─────────────┐  ┌─────────┐  │
//!                    │  │ registry │  │observability│  │lifecycle│  │
//!                    │  │ (config) │  │ logs+metrics│  │shutdown │  │
//!                    │  └──────────┘  └─────────────┘  └─────────┘  │
//!                    └──────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use tokio::net::TcpListener;

use fleet_warden::config;
use fleet_warden::config::validation::validate_config;
use fleet_warden::health::HealthAggregator;
use fleet_warden::http::HttpServer;
use fleet_warden::lifecycle::Shutdown;
use fleet_warden::observability::{logging, metrics};
use fleet_warden::registry::ServiceRegistry;
use fleet_warden::scheduler::PingScheduler;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Arc::new(config::from_env());

    logging::init_logging(&config.observability.log_level);

    tracing::info!(
        service = %config.service_name,
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.health.environment,
        "fleet-warden starting"
    );

    for warning in validate_config(&config) {
        tracing::warn!("{}", warning);
    }

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => {
                tracing::error!(
                    metrics_address = %config.observability.metrics_address,
                    error = %e,
                    "Failed to parse metrics address"
                );
            }
        }
    }

    // Registry is built once; everything downstream reads it through Arcs.
    let registry = Arc::new(ServiceRegistry::from_config(
        &config.service_name,
        &config.fleet,
    ));

    let scheduler = Arc::new(PingScheduler::new(
        config.service_name.clone(),
        config.keep_alive.clone(),
        registry.clone(),
    ));
    if config.keep_alive.autostart {
        scheduler.start();
    }

    // Readiness gates on the fleet members named in REQUIRED_SERVICES.
    let mut aggregator = HealthAggregator::new(config.service_name.clone(), &config.health);
    for name in &config.health.required_services {
        match registry.get(name) {
            Some(descriptor) => {
                aggregator = aggregator
                    .with_external_service(&descriptor.name, descriptor.base_url.clone());
            }
            None => {
                tracing::warn!(service = %name, "Required service is not in the registry, cannot gate on it");
            }
        }
    }
    let aggregator = Arc::new(aggregator);

    let shutdown = Arc::new(Shutdown::new());
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move { shutdown.listen_for_signals().await });
    }

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    let server = HttpServer::new(config.clone(), aggregator, scheduler.clone());
    server.run(listener, shutdown.subscribe()).await?;

    scheduler.stop();
    tracing::info!("Shutdown complete");
    Ok(())
}
