//! Proxy request/response types and error definitions.

use std::error::Error as StdError;

use axum::body::Bytes;
use axum::http::{HeaderValue, StatusCode};
use thiserror::Error;
use url::Url;

/// A validated request to forward upstream. Always a GET.
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyRequest {
    /// Absolute http(s) URL that passed the allow-list.
    pub target_url: Url,
}

impl ProxyRequest {
    /// Append caller query parameters (other than `url`) to the target.
    pub fn with_query(mut self, params: &[(String, String)]) -> Self {
        let extra: Vec<_> = params.iter().filter(|(k, _)| k != "url").collect();
        if !extra.is_empty() {
            let mut pairs = self.target_url.query_pairs_mut();
            for (k, v) in extra {
                pairs.append_pair(k, v);
            }
        }
        self
    }
}

/// Upstream reply, ready to be written back to the caller.
#[derive(Debug, Clone)]
pub struct ProxyResponse {
    /// Upstream status, relayed unchanged.
    pub status: StatusCode,
    /// Upstream body, byte-for-byte.
    pub body: Bytes,
    /// Upstream Content-Type as received, or the configured default.
    pub content_type: HeaderValue,
    /// Client caching hint.
    pub cache_control: Option<String>,
}

/// Errors that can occur while handling a proxy request.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Required query parameter absent or empty.
    #[error("Missing required query parameter: {0}")]
    MissingParameter(&'static str),

    /// Target is not an absolute http(s) URL.
    #[error("Invalid target URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Target is not on the allow-list.
    #[error("Domain not allowed. Allowed domains: {}", .allowed.join(", "))]
    DomainNotAllowed { allowed: Vec<String> },

    /// No alias with this name.
    #[error("Unknown alias: {0}")]
    UnknownAlias(String),

    /// Upstream did not answer within the deadline.
    #[error("Upstream request timed out after {0}s")]
    Timeout(f64),

    /// Connection-level failure (DNS, refused, TLS, redirect loop, body read).
    #[error("Upstream request failed: {0}")]
    Upstream(String),

    /// Anything unclassified.
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ProxyError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::MissingParameter(_) | ProxyError::InvalidUrl { .. } => {
                StatusCode::BAD_REQUEST
            }
            ProxyError::DomainNotAllowed { .. } => StatusCode::FORBIDDEN,
            ProxyError::UnknownAlias(_) => StatusCode::NOT_FOUND,
            ProxyError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ProxyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyError::MissingParameter(_) => "missing_parameter",
            ProxyError::InvalidUrl { .. } => "invalid_url",
            ProxyError::DomainNotAllowed { .. } => "forbidden",
            ProxyError::UnknownAlias(_) => "unknown_alias",
            ProxyError::Timeout(_) => "timeout",
            ProxyError::Upstream(_) => "bad_gateway",
            ProxyError::Internal(_) => "internal",
        }
    }

    /// Classify a client error from the outbound call.
    pub fn from_reqwest(err: reqwest::Error, timeout_secs: f64) -> Self {
        if err.is_timeout() {
            ProxyError::Timeout(timeout_secs)
        } else if err.is_connect()
            || err.is_request()
            || err.is_redirect()
            || err.is_body()
            || err.is_decode()
        {
            ProxyError::Upstream(error_chain(&err))
        } else {
            ProxyError::Internal(error_chain(&err))
        }
    }
}

/// Render an error and all of its sources as one line.
pub fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
