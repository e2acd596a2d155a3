//! NBKR CORS Proxy Library
//!
//! A GET-only forwarding proxy that relays allow-listed upstream responses
//! verbatim and attaches CORS headers to everything it returns.

pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod security;

pub use config::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use proxy::{ProxyError, ProxyResponse, ProxyService};
