//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! process environment
//!     → env.rs (resolve variables, fleet URLs, cloud detection)
//!     → validation.rs (semantic checks, warnings only)
//!     → WardenConfig (resolved, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once resolved; changes require a restart
//! - All fields have defaults so an empty environment still boots
//! - A missing sibling URL shrinks the fleet, it is never a startup error

pub mod env;
pub mod schema;
pub mod validation;

pub use env::from_env;
pub use schema::FleetConfig;
pub use schema::HealthConfig;
pub use schema::KeepAliveConfig;
pub use schema::WardenConfig;
