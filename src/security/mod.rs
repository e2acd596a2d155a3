//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming proxy request:
//!     → URL parsed and checked for http(s)
//!     → allowlist.rs (target domain policy)
//!     → Pass to forwarder
//! ```
//!
//! # Design Decisions
//! - Fail closed: a rejected target never reaches the network
//! - Policy is immutable and built once at startup

pub mod allowlist;

pub use allowlist::DomainPolicy;
