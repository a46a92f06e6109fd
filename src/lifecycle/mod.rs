//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Resolve config → log warnings → build registry → start scheduler
//!     → bind listener → serve
//!
//! Shutdown (shutdown.rs):
//!     SIGTERM / ctrl-c → broadcast shutdown → server drains, scheduler
//!     timers exit → process exits
//! ```
//!
//! # Design Decisions
//! - One broadcast channel; every long-running task subscribes
//! - Shutdown does not cancel in-flight probes; they resolve or time out
//!   within their per-probe bound, so termination is finite

pub mod shutdown;

pub use shutdown::Shutdown;
