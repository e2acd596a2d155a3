//! Upstream health probe.
//!
//! # Responsibilities
//! - GET a fixed upstream URL with a short timeout
//! - Report reachability and latency
//! - Never propagate an error: failures downgrade to `degraded`

use std::time::{Duration, Instant};

use axum::http::StatusCode;
use reqwest::{redirect, Client};
use serde::Serialize;

use crate::config::{HealthConfig, UpstreamConfig};
use crate::observability::metrics;
use crate::proxy::types::error_chain;

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HealthReport {
    pub status: &'static str,
    pub nbkr_api_status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nbkr_response_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HealthProber {
    client: Client,
    probe_url: String,
}

impl HealthProber {
    pub fn new(health: &HealthConfig, upstream: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder()
            .redirect(redirect::Policy::none())
            .pool_max_idle_per_host(0)
            .user_agent(upstream.user_agent.clone());
        if let Some(timeout) = health.timeout() {
            builder = builder.timeout(timeout);
        }
        if !upstream.use_system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            probe_url: health.probe_url.clone(),
        })
    }

    pub async fn check(&self) -> HealthReport {
        let start = Instant::now();

        let report = match self.client.get(&self.probe_url).send().await {
            Ok(response) => {
                let available = response.status() == StatusCode::OK;
                if !available {
                    tracing::warn!(
                        url = %self.probe_url,
                        status = %response.status(),
                        "Health probe: upstream returned non-200"
                    );
                }
                HealthReport {
                    status: "healthy",
                    nbkr_api_status: if available { "available" } else { "unavailable" },
                    nbkr_response_time: Some(format_elapsed(start.elapsed())),
                    error: None,
                }
            }
            Err(e) => {
                tracing::warn!(url = %self.probe_url, error = %e, "Health probe failed");
                HealthReport {
                    status: "degraded",
                    nbkr_api_status: "unavailable",
                    nbkr_response_time: None,
                    error: Some(error_chain(&e)),
                }
            }
        };

        metrics::record_upstream_health(report.nbkr_api_status == "available");
        report
    }
}

fn format_elapsed(elapsed: Duration) -> String {
    format!("{:.2}s", elapsed.as_secs_f64())
}
