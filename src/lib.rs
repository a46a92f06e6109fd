//! Fleet keep-warm and health reporting library.
//!
//! Embeddable core behind the `fleet-warden` daemon: a sibling registry, a
//! bounded-time prober, the keep-alive scheduler and the health report
//! aggregator, plus the axum binding that serves them.

pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod probe;
pub mod registry;
pub mod scheduler;

pub use config::WardenConfig;
pub use health::HealthAggregator;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use registry::ServiceRegistry;
pub use scheduler::PingScheduler;
