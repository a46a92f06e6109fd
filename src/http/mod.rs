//! HTTP surface of the warden.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → server.rs (Axum setup, request ID, timeout, trace)
//!     → handlers.rs (bind aggregator/scheduler to routes)
//!     → report serialized as JSON, Healthy → 200, else 503
//! ```

pub mod handlers;
pub mod server;

pub use server::{AppState, HttpServer};
