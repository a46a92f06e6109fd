//! Observability subsystem.
//!
//! # Responsibilities
//! - Initialize structured logging (tracing + env filter)
//! - Expose a Prometheus metrics endpoint and low-overhead recorders for
//!   ping outcomes and health requests

pub mod logging;
pub mod metrics;
