//! Health reporting subsystem.
//!
//! # Data Flow
//! ```text
//! Check sources (checks.rs):
//!     dependency probe │ external services │ custom checks
//!                      ▼
//! Aggregation (report.rs):
//!     run all sources → worst status wins → HealthReport
//!     dependency + required services → ReadinessReport
//!     nothing at all → LivenessReport
//!                      ▼
//! Transport binding (http::handlers):
//!     Healthy → 200, anything else → 503
//! ```
//!
//! # Design Decisions
//! - Every check source produces the same tagged `CheckResult`; the
//!   aggregator branches on `status` only, never on detail shape
//! - Dependency failures are data in the report, not handler errors

pub mod checks;
pub mod report;
pub mod status;
pub mod system;

pub use checks::Check;
pub use report::{HealthAggregator, HealthReport, LivenessReport, ReadinessReport};
pub use status::{CheckResult, CheckStatus};
