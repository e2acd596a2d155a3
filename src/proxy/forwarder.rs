//! Outbound GET to the upstream.
//!
//! One attempt per request, no retries. The client keeps no idle
//! connections so every socket lives only as long as its call.

use std::time::Instant;

use axum::http::{header::CONTENT_TYPE, HeaderValue};
use reqwest::{redirect, Client};

use crate::config::UpstreamConfig;
use crate::proxy::types::{ProxyError, ProxyRequest, ProxyResponse};

#[derive(Debug, Clone)]
pub struct Forwarder {
    client: Client,
    timeout_secs: f64,
    default_content_type: HeaderValue,
    cache_control: Option<String>,
}

impl Forwarder {
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let default_content_type = HeaderValue::from_str(&config.default_content_type)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));

        let mut builder = Client::builder()
            .redirect(redirect::Policy::limited(config.max_redirects))
            .pool_max_idle_per_host(0)
            .user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build()?;

        let cache_control = (config.cache_max_age_secs > 0)
            .then(|| format!("public, max-age={}", config.cache_max_age_secs));

        Ok(Self {
            client,
            timeout_secs: config.timeout_secs,
            default_content_type,
            cache_control,
        })
    }

    /// Issue the GET and buffer the reply.
    pub async fn forward(&self, request: &ProxyRequest) -> Result<ProxyResponse, ProxyError> {
        let start = Instant::now();
        let url = request.target_url.as_str();

        let response = self
            .client
            .get(request.target_url.clone())
            .send()
            .await
            .map_err(|e| ProxyError::from_reqwest(e, self.timeout_secs))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .cloned()
            .unwrap_or_else(|| self.default_content_type.clone());

        let body = response
            .bytes()
            .await
            .map_err(|e| ProxyError::from_reqwest(e, self.timeout_secs))?;

        tracing::info!(
            url = %url,
            status = %status,
            content_type = ?content_type,
            bytes = body.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Upstream response received"
        );

        Ok(ProxyResponse {
            status,
            body,
            content_type,
            cache_control: self.cache_control.clone(),
        })
    }
}
