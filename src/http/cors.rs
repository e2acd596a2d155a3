//! CORS policy.
//!
//! `CorsLayer` matches origins, sets `Vary` and answers `OPTIONS` preflights.
//! [`cors_fallback`] runs outside it and fills in what the layer leaves out,
//! so every response, errors and router fallbacks included, carries
//! `Access-Control-Allow-Origin`, `-Methods` and `-Headers`.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, Method},
    middleware::Next,
    response::Response,
};
use tower_http::cors::{AllowHeaders, AllowOrigin, Any, CorsLayer};

use crate::config::CorsConfig;

/// Build the tower-http layer for the configured policy.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins = restricted_origins(config);
    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    };

    let allow_headers: AllowHeaders = if config.allow_headers.iter().any(|h| h.trim() == "*") {
        Any.into()
    } else {
        config
            .allow_headers
            .iter()
            .filter_map(|h| HeaderName::from_bytes(h.trim().as_bytes()).ok())
            .collect::<Vec<_>>()
            .into()
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(methods(config))
        .allow_headers(allow_headers)
        .max_age(Duration::from_secs(config.max_age_secs))
}

/// Headers `CorsLayer` does not put on every response.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    fallback_origin: HeaderValue,
    allow_methods: HeaderValue,
    allow_headers: HeaderValue,
}

impl CorsPolicy {
    pub fn from_config(config: &CorsConfig) -> Self {
        let fallback_origin = restricted_origins(config)
            .into_iter()
            .next()
            .unwrap_or_else(|| HeaderValue::from_static("*"));

        let methods = methods(config)
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(",");

        Self {
            fallback_origin,
            allow_methods: HeaderValue::from_str(&methods)
                .unwrap_or_else(|_| HeaderValue::from_static("GET,OPTIONS")),
            allow_headers: HeaderValue::from_str(&config.allow_headers.join(","))
                .unwrap_or_else(|_| HeaderValue::from_static("*")),
        }
    }

    /// Insert any CORS header missing from `headers`.
    ///
    /// An origin outside the allow-list leaves `CorsLayer` silent; it gets the
    /// first configured origin, which browsers will reject.
    pub fn fill(&self, headers: &mut HeaderMap) {
        headers
            .entry(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .or_insert_with(|| self.fallback_origin.clone());
        headers
            .entry(header::ACCESS_CONTROL_ALLOW_METHODS)
            .or_insert_with(|| self.allow_methods.clone());
        headers
            .entry(header::ACCESS_CONTROL_ALLOW_HEADERS)
            .or_insert_with(|| self.allow_headers.clone());
    }
}

pub async fn cors_fallback(
    State(policy): State<Arc<CorsPolicy>>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    policy.fill(response.headers_mut());
    response
}

/// Configured origins, or none when `*` is among them.
fn restricted_origins(config: &CorsConfig) -> Vec<HeaderValue> {
    if config.allows_any_origin() {
        return Vec::new();
    }
    config
        .allowed_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o.trim().trim_end_matches('/')).ok())
        .collect()
}

fn methods(config: &CorsConfig) -> Vec<Method> {
    let methods: Vec<Method> = config
        .allow_methods
        .iter()
        .filter_map(|m| Method::from_bytes(m.trim().to_ascii_uppercase().as_bytes()).ok())
        .collect();
    if methods.is_empty() {
        vec![Method::GET, Method::OPTIONS]
    } else {
        methods
    }
}
