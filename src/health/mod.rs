//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! GET /health
//!     → probe.rs (one GET to the configured probe URL, short timeout)
//!     → HealthReport { status, nbkr_api_status, nbkr_response_time | error }
//! ```
//!
//! # Design Decisions
//! - On demand only; no background polling
//! - Independent of the allow-list policy
//! - Always answers 200; the body carries the verdict

pub mod probe;

pub use probe::{HealthProber, HealthReport};
