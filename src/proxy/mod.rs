//! Forwarding proxy subsystem.
//!
//! # Data Flow
//! ```text
//! handler (url query or alias)
//!     → service.rs (presence, URL syntax, allow-list)
//!     → forwarder.rs (single GET, redirects followed, bounded timeout)
//!     → types.rs ProxyResponse (status, bytes, content type)
//!     → http::response (written back with CORS headers)
//! ```
//!
//! # Design Decisions
//! - Upstream 4xx/5xx are relayed, not treated as errors
//! - Rejections happen before any network I/O
//! - No retries; a timeout cancels the in-flight call

pub mod forwarder;
pub mod service;
pub mod types;

pub use forwarder::Forwarder;
pub use service::ProxyService;
pub use types::{ProxyError, ProxyRequest, ProxyResponse};
